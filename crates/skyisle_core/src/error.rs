use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsleError {
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("connectivity error: {message}")]
    Connectivity { message: String },
    #[error("persistence error: {message}")]
    Persistence { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl IsleError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Startup failures that must abort the host rather than degrade.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Connectivity { .. })
    }
}

pub type IsleResult<T> = Result<T, IsleError>;

impl From<sea_orm::DbErr> for IsleError {
    fn from(value: sea_orm::DbErr) -> Self {
        IsleError::persistence(value.to_string())
    }
}
