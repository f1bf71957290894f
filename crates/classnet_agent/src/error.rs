use classnet_common::ClassnetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to read release file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("release file path '{0}' is not a safe relative path")]
    UnsafePath(String),

    #[error("manifest cache lock poisoned")]
    Poisoned,

    #[error("release task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<AgentError> for ClassnetError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::UnsafePath(_) => ClassnetError::ConfigError(err.to_string()),
            _ => ClassnetError::InternalError(err.to_string()),
        }
    }
}
