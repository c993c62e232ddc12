use thiserror::Error;

use crate::status::Code;

#[derive(Debug, Error)]
pub enum CosiError {
    #[error("invalid storage parameters: {0}")]
    InvalidParameters(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("secret not found: {namespace}/{name}")]
    SecretNotFound { name: String, namespace: String },
    #[error("secret store error: {0}")]
    SecretStore(String),
    #[error("failed to initialize storage client: {0}")]
    ClientInit(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CosiError {
    pub fn code(&self) -> Code {
        match self {
            Self::InvalidParameters(_) | Self::MissingParameter(_) => Code::InvalidArgument,
            Self::SecretNotFound { .. } => Code::NotFound,
            Self::SecretStore(_) | Self::ClientInit(_) | Self::InternalError(_) | Self::Io(_) => {
                Code::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CosiError>;
