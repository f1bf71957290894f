use classnet_common::ClassnetError;
use thiserror::Error;

/// Errors raised while minting or decoding credentials.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("administrator '{principal}' may not manage classroom '{classroom_id}'")]
    NotPermitted {
        principal: String,
        classroom_id: String,
    },

    #[error("failed to encode credential: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<TokenError> for ClassnetError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotPermitted { .. } => ClassnetError::AuthInvalid(err.to_string()),
            TokenError::Malformed(msg) => ClassnetError::ValidationError(msg),
            TokenError::InvalidKey(msg) => ClassnetError::ConfigError(msg),
            TokenError::Encoding(e) => ClassnetError::InternalError(e.to_string()),
        }
    }
}
