use classnet_common::ClassnetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {0} in catalog")]
    Duplicate(String),

    #[error("catalog lock poisoned")]
    Poisoned,
}

impl From<PolicyError> for ClassnetError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Io(_) | PolicyError::Parse(_) | PolicyError::Duplicate(_) => {
                ClassnetError::ConfigError(err.to_string())
            }
            PolicyError::Poisoned => ClassnetError::InternalError(err.to_string()),
        }
    }
}
