use thiserror::Error;

pub type Result<T, E = SimpleExceptionsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SimpleExceptionsError {
    #[error("Invalid HTTP status code: {code}")]
    InvalidStatusCode { code: u16 },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },
}

impl SimpleExceptionsError {
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}
