use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} config JSON parse error: {source}")]
    InvalidPayload {
        kind: String,
        source: serde_json::Error,
    },

    #[error("formula render error ({message}): {formula}")]
    Formula { message: String, formula: String },

    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),

    #[error("invalid think tag {tag:?}: {source}")]
    ThinkTag { tag: String, source: regex::Error },

    #[error("cursor {cursor} is not a char boundary of a {len} byte buffer")]
    InvalidCursor { cursor: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
