/// Error types shared across the advisory crates.
///
/// These cover the pure parsing/formatting core (model output extraction and guide
/// layout). Network client errors live beside their clients. Application-specific
/// errors are defined in the server crate and wrap these via `#[from]`.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("model response contained invalid JSON: {0}")]
    InvalidJson(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuideError {
    #[error("guide record is missing field: {0}")]
    MissingField(String),
}
