use std::path::PathBuf;

use thiserror::Error;

use crate::project::ProjectType;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input directory '{}' does not exist", .0.display())]
    InputMissing(PathBuf),

    #[error("Unsupported project type '{0}', only Maven projects can be converted")]
    UnsupportedProject(ProjectType),

    #[error("Invalid conversion options: {}", .errors.join("; "))]
    InvalidOptions { errors: Vec<String> },

    #[error("Generated workflow failed validation: {}", .errors.join("; "))]
    InvalidDocument { errors: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
