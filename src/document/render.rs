//! Block-style YAML rendering of a [`Mapping`] tree.

use super::{Mapping, Value};

const INDENT: &str = "  ";

/// Render `document` as block YAML, two spaces per level, keys in insertion
/// order. The output always ends with a newline.
pub fn render(document: &Mapping) -> String {
    let mut lines = mapping_lines(document, 0);
    lines.push(String::new());
    lines.join("\n")
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn mapping_lines(map: &Mapping, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = Vec::new();
    for (key, value) in map {
        match value {
            Value::Mapping(inner) if inner.is_empty() => lines.push(format!("{pad}{key}: {{}}")),
            Value::Mapping(inner) => {
                lines.push(format!("{pad}{key}:"));
                lines.extend(mapping_lines(inner, depth + 1));
            }
            Value::Sequence(items) if items.is_empty() => lines.push(format!("{pad}{key}: []")),
            Value::Sequence(items) => {
                lines.push(format!("{pad}{key}:"));
                lines.extend(sequence_lines(items, depth));
            }
            Value::Scalar(text) => lines.push(format!("{pad}{key}: {text}")),
            Value::Boolean(flag) => lines.push(format!("{pad}{key}: {flag}")),
            Value::Multiline(text) => {
                lines.push(format!("{pad}{key}: {}", block_header(text)));
                lines.extend(block_lines(text, depth + 1));
            }
        }
    }
    lines
}

// List markers share the indentation of the owning key; entry content sits
// one level deeper so that `- ` lines up with it.
fn sequence_lines(items: &[Value], depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = Vec::new();
    for item in items {
        match item {
            Value::Mapping(inner) if inner.is_empty() => lines.push(format!("{pad}- {{}}")),
            Value::Mapping(inner) => {
                lines.extend(with_marker(mapping_lines(inner, depth + 1), depth));
            }
            Value::Sequence(inner) if inner.is_empty() => lines.push(format!("{pad}- []")),
            Value::Sequence(inner) => {
                lines.extend(with_marker(sequence_lines(inner, depth + 1), depth));
            }
            Value::Scalar(text) => lines.push(format!("{pad}- {text}")),
            Value::Boolean(flag) => lines.push(format!("{pad}- {flag}")),
            Value::Multiline(text) => {
                lines.push(format!("{pad}- {}", block_header(text)));
                lines.extend(block_lines(text, depth + 1));
            }
        }
    }
    lines
}

fn with_marker(mut lines: Vec<String>, depth: usize) -> Vec<String> {
    if let Some(first) = lines.first_mut() {
        let content_start = indent(depth + 1).len();
        *first = format!("{}- {}", indent(depth), &first[content_start..]);
    }
    lines
}

// Literal block header. Chomping is chosen so the text reads back exactly:
// keep (`+`) when it ends with a newline, strip (`-`) otherwise. An explicit
// indentation indicator is needed when the first non-empty line starts with
// whitespace, since readers would otherwise take it as indentation.
fn block_header(text: &str) -> String {
    let leading_space = text
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));
    let indentation = if leading_space { INDENT.len().to_string() } else { String::new() };
    let chomping = if text.ends_with('\n') { "+" } else { "-" };
    format!("|{indentation}{chomping}")
}

fn block_lines(text: &str, depth: usize) -> Vec<String> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    if body.is_empty() && !text.ends_with('\n') {
        return Vec::new();
    }
    let pad = indent(depth);
    body.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect()
}
