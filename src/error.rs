use std::path::PathBuf;
use std::process::ExitCode;

use crate::domain::tts::TtsServiceError;
use crate::infrastructure::config::ConfigError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tts(#[from] TtsServiceError),

    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to print results: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code for this error
    ///
    /// - 2: bad input or configuration, nothing was sent to the provider
    /// - 3: the provider failed
    /// - 4: audio could not be decoded or encoded
    /// - 1: anything else
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Input { .. } => 2,
            Self::Tts(err) => match err {
                TtsServiceError::UnknownVoice(_)
                | TtsServiceError::InvalidRequest(_)
                | TtsServiceError::InvalidBatchInput(_) => 2,
                TtsServiceError::Backend { .. } => 3,
                TtsServiceError::Audio(_) => 4,
                TtsServiceError::Io { .. } | TtsServiceError::Other(_) => 1,
            },
            Self::Output(_) | Self::Serialization(_) => 1,
        }
    }
}

impl From<AppError> for ExitCode {
    fn from(err: AppError) -> Self {
        ExitCode::from(err.exit_code())
    }
}

impl From<crate::domain::tts::UnknownVoiceError> for AppError {
    fn from(err: crate::domain::tts::UnknownVoiceError) -> Self {
        AppError::Tts(err.into())
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
