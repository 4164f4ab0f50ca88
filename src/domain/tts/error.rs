use std::path::PathBuf;

use super::voices::UnknownVoiceError;
use crate::infrastructure::audio::AudioError;
use crate::infrastructure::repositories::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error(transparent)]
    UnknownVoice(#[from] UnknownVoiceError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid batch input: {0}")]
    InvalidBatchInput(String),
    /// The backend failed on the input at `index` (position within the
    /// operation, counting every text in order).
    #[error("synthesis failed for input #{index} ({text:?}): {source}")]
    Backend {
        index: usize,
        text: String,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TtsServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TtsServiceError::Io {
            path: path.into(),
            source,
        }
    }
}
