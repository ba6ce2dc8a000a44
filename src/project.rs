use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Build system detected next to a pipeline file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Maven,
    Gradle,
    Node,
    Generic,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Maven => "maven",
            ProjectType::Gradle => "gradle",
            ProjectType::Node => "node",
            ProjectType::Generic => "generic",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked in order, first hit wins.
const DESCRIPTORS: &[(&str, ProjectType)] = &[
    ("pom.xml", ProjectType::Maven),
    ("build.gradle", ProjectType::Gradle),
    ("build.gradle.kts", ProjectType::Gradle),
    ("package.json", ProjectType::Node),
];

/// Classify the project rooted at `dir` by the build descriptors it contains.
pub fn classify(dir: &Path) -> ProjectType {
    DESCRIPTORS
        .iter()
        .find(|(file, _)| dir.join(file).is_file())
        .map(|(_, project_type)| *project_type)
        .unwrap_or(ProjectType::Generic)
}
