pub mod polly_tts_repository;
pub mod tts_repository;

pub use polly_tts_repository::PollyTtsRepository;
pub use tts_repository::{BackendError, BackendErrorKind, TtsRepository};
