pub mod batch_input;
pub mod error;
pub mod filename;
pub mod model;
pub mod service;
pub mod voices;

pub use batch_input::{parse_pair_batch, parse_text_batch};
pub use error::TtsServiceError;
pub use filename::{allocate_filename, normalize_text};
pub use model::{
    EngineTier, MergeStrategy, SynthesisRequest, SynthesisResult, VoiceProfile, DEFAULT_PAUSE_MS,
    DEFAULT_RATE, TEXT_DELIMITER, VOICE_DELIMITER,
};
pub use service::{TtsService, TtsServiceApi};
pub use voices::{UnknownVoiceError, VoiceRegistry};
