use std::path::PathBuf;

use thiserror::Error;

/// Domain errors that callers match on. I/O and parse failures travel as `anyhow::Error`
/// with context attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteError {
    #[error("{field} rating must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: String, value: i64 },

    #[error("Invalid slug '{0}': only lowercase letters, digits and single hyphens are allowed")]
    InvalidSlug(String),

    #[error("Duplicate plant id: {0}")]
    DuplicateId(String),

    #[error("Article '{slug}' has no English {field}")]
    MissingField { slug: String, field: String },

    #[error("Article '{article}' ({lang}) mentions unknown plant id '{plant_id}'")]
    DanglingReference { article: String, lang: String, plant_id: String },

    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("Environment variable {0} is not set")]
    MissingToken(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),
}
