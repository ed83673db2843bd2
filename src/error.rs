use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Entropy provider unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed entropy response: {0}")]
    Decode(String),

    #[error("Entropy provider reported failure: {0}")]
    Provider(String),

    #[error("Entropy request count must be at least 1, got {0}")]
    InvalidCount(usize),

    #[error("Chain integrity violated at block {index}: {fault}")]
    Integrity { index: usize, fault: IntegrityFault },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChainError {
    /// Index of the offending block, for integrity failures.
    pub fn invalid_index(&self) -> Option<usize> {
        match self {
            ChainError::Integrity { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// What exactly broke when a chain fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityFault {
    #[error("stored hash {stored} does not match recomputed {computed}")]
    HashMismatch { stored: String, computed: String },

    #[error("expected index {expected}, found {found}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("prev_hash {found} does not link to {expected}")]
    BrokenLink { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, ChainError>;
