use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static STAGE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)stage\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("stage pattern is valid")
});

// From a stage declaration up to the first pair of closing braces.
static STAGE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A.*?\}\s*\}").expect("stage body pattern is valid"));

static SHELL_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bsh\s+['"]([^'"]+)['"]"#).expect("sh pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageCategory {
    Build,
    Test,
    Deliver,
    Security,
}

impl fmt::Display for StageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageCategory::Build => "build",
            StageCategory::Test => "test",
            StageCategory::Deliver => "deliver",
            StageCategory::Security => "security",
        };
        f.write_str(label)
    }
}

// First category with a matching keyword wins, so "Build and Test" is a build.
const KEYWORDS: &[(StageCategory, &[&str])] = &[
    (StageCategory::Build, &["build", "compile", "package"]),
    (StageCategory::Test, &["test", "unit", "integration"]),
    (
        StageCategory::Deliver,
        &["deploy", "deliver", "publish", "release"],
    ),
    (
        StageCategory::Security,
        &["security", "scan", "vulnerability", "audit"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub name: String,
    pub category: StageCategory,
    /// Shell commands found in the stage body.
    pub commands: Vec<String>,
}

/// Map a stage name onto a category by case-insensitive keyword search.
pub fn classify_stage(name: &str) -> StageCategory {
    let lowered = name.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| lowered.contains(word)))
        .map(|(category, _)| *category)
        .unwrap_or(StageCategory::Build)
}

/// Extract every `stage('<name>')` declaration in document order.
///
/// Duplicate names are kept as separate entries and `stage('')` does not
/// count as a declaration. A
/// file without declarations yields an empty list.
pub fn extract_stages(content: &str) -> Vec<Stage> {
    STAGE_DECLARATION
        .captures_iter(content)
        .filter_map(|caps| {
            let declaration = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            Some(Stage {
                name: name.to_string(),
                category: classify_stage(name),
                commands: stage_commands(&content[declaration.start()..]),
            })
        })
        .collect()
}

fn stage_commands(from_declaration: &str) -> Vec<String> {
    let Some(body) = STAGE_BODY.find(from_declaration) else {
        return Vec::new();
    };
    SHELL_STEP
        .captures_iter(body.as_str())
        .filter_map(|caps| caps.get(1).map(|cmd| cmd.as_str().to_string()))
        .collect()
}
