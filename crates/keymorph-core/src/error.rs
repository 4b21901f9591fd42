use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeymorphError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Insufficient corpus: {0}")]
    InsufficientCorpus(String),
}

pub type KmResult<T> = Result<T, KeymorphError>;
