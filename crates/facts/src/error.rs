use thiserror::Error;

pub type Result<T> = std::result::Result<T, FactsError>;

#[derive(Error, Debug)]
pub enum FactsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed fact on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("fact '{fact}' has non-finite number in prop '{key}'")]
    NonFiniteProp { fact: String, key: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Returned when a kind name does not belong to the closed enumeration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what} '{value}'")]
pub struct ParseKindError {
    pub what: &'static str,
    pub value: String,
}
