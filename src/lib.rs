pub mod converter;
pub mod document;
pub mod error;
pub mod jenkinsfile;
pub mod mirror;
pub mod options;
pub mod project;
pub mod report;
pub mod validation;
pub mod workflow;

pub use converter::Converter;
pub use error::ConvertError;
pub use options::ConvertOptions;
pub use report::ConversionReport;
