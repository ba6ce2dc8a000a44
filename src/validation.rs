use serde::Serialize;

use crate::document::{Mapping, Value};
use crate::options::ConvertOptions;

#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_options(options: &ConvertOptions) -> ValidationReport {
    let mut report = ValidationReport::default();

    if options.versions.is_empty() {
        report
            .errors
            .push("At least one Java version is required".into());
    }

    let mut seen = Vec::new();
    for (idx, version) in options.versions.iter().enumerate() {
        if let Some(problem) = plain_scalar_problem(version) {
            report.errors.push(format!(
                "Java version {} ('{}') {}",
                idx + 1,
                version,
                problem
            ));
        }
        if seen.contains(&version) {
            report
                .warnings
                .push(format!("Java version '{version}' is listed more than once"));
        }
        seen.push(version);
    }

    if let Some(problem) = plain_scalar_problem(&options.runner) {
        report
            .errors
            .push(format!("Runner '{}' {}", options.runner, problem));
    }

    report
}

/// Check that every key and value in `document` renders without being
/// reinterpreted by a YAML reader.
pub fn validate_document(document: &Mapping) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_mapping(document, "", &mut report);
    report
}

fn check_mapping(map: &Mapping, path: &str, report: &mut ValidationReport) {
    for (key, value) in map {
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        if let Some(problem) = plain_scalar_problem(key) {
            report.errors.push(format!("Key '{child}' {problem}"));
        }
        check_value(value, &child, report);
    }
}

fn check_value(value: &Value, path: &str, report: &mut ValidationReport) {
    match value {
        Value::Mapping(map) => check_mapping(map, path, report),
        Value::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                let child = format!("{path}[{idx}]");
                if matches!(item, Value::Mapping(map) if map.is_empty()) {
                    report.warnings.push(format!("Entry '{child}' is empty"));
                }
                check_value(item, &child, report);
            }
        }
        Value::Scalar(text) => {
            if let Some(problem) = plain_scalar_problem(text) {
                report.errors.push(format!("Value at '{path}' {problem}"));
            }
        }
        Value::Boolean(_) => {}
        Value::Multiline(text) => {
            if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
                report.errors.push(format!(
                    "Block at '{path}' contains control characters"
                ));
            }
        }
    }
}

const INDICATORS: &[char] = &[
    ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

fn plain_scalar_problem(text: &str) -> Option<&'static str> {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return Some("is empty");
    };
    let second = chars.next();

    if text.chars().any(char::is_control) {
        return Some("contains control characters or line breaks");
    }
    if text.trim() != text {
        return Some("has leading or trailing whitespace");
    }
    if text.contains(": ") || text.ends_with(':') {
        return Some("contains a mapping indicator");
    }
    if text.contains(" #") {
        return Some("contains a comment indicator");
    }
    if INDICATORS.contains(&first) {
        return Some("starts with a reserved indicator");
    }
    if matches!(first, '-' | '?' | ':') && second.is_none_or(char::is_whitespace) {
        return Some("starts with a block indicator");
    }
    if !reads_back_unchanged(text) {
        return Some("reads back as a different YAML value");
    }
    None
}

// `true`, `null`, `~` or `1.10` would come back as a boolean, null or `1.1`.
// Numbers are fine as long as they print the way they were written.
fn reads_back_unchanged(text: &str) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(serde_yaml::Value::String(read)) => read == text,
        Ok(serde_yaml::Value::Number(number)) => number.to_string() == text,
        _ => false,
    }
}
