use crate::domain::tts::SynthesisRequest;
use async_trait::async_trait;
use std::fmt;

/// Broad class of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    RateLimited,
    InvalidInput,
    Unsupported,
    Network,
    Other,
}

impl BackendErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendErrorKind::RateLimited => "rate limited",
            BackendErrorKind::InvalidInput => "invalid input",
            BackendErrorKind::Unsupported => "unsupported",
            BackendErrorKind::Network => "network",
            BackendErrorKind::Other => "provider",
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider so the service can be driven by a
/// fake in tests.
///
/// Implementations are responsible for:
/// - Translating the request's voice profile into provider parameters
/// - Applying the speech rate
/// - Returning encoded MP3 bytes exactly as the provider produced them
///
/// Retries and timeouts, if any, live in the implementation; the service
/// treats every failure the same way.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one request to encoded audio (MP3 format)
    ///
    /// # Errors
    /// Returns a classified [`BackendError`] if the provider rejects the
    /// request or cannot be reached
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError>;
}
