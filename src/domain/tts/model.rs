use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::error::TtsServiceError;
use super::filename::normalize_text;

/// Speech rate used when the caller does not pick one (percent of normal speed).
pub const DEFAULT_RATE: u32 = 75;

/// Pause inserted between merged segments when the caller does not pick one.
pub const DEFAULT_PAUSE_MS: u32 = 500;

/// Joins the texts of a merged output.
pub const TEXT_DELIMITER: &str = " | ";

/// Joins the voice names of a merged output.
pub const VOICE_DELIMITER: &str = "+";

/// Polly engine tier a voice runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineTier {
    Standard,
    Neural,
}

impl EngineTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineTier::Standard => "standard",
            EngineTier::Neural => "neural",
        }
    }
}

impl fmt::Display for EngineTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named bundle of provider parameters.
///
/// Identity is the display name, compared case-insensitively by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub display_name: String,
    pub provider_voice_id: String,
    pub language_code: String,
    pub engine_tier: EngineTier,
}

impl VoiceProfile {
    pub fn new(
        display_name: impl Into<String>,
        provider_voice_id: impl Into<String>,
        language_code: impl Into<String>,
        engine_tier: EngineTier,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            provider_voice_id: provider_voice_id.into(),
            language_code: language_code.into(),
            engine_tier,
        }
    }
}

/// One unit of synthesis work: a text, the voice to speak it with and a rate.
///
/// Built through [`SynthesisRequest::new`], which normalizes whitespace and
/// rejects empty text and a zero rate, so every value that exists is valid
/// to hand to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    text: String,
    voice: VoiceProfile,
    rate: u32,
    sample_rate: Option<u32>,
}

impl SynthesisRequest {
    pub fn new(
        text: impl AsRef<str>,
        voice: VoiceProfile,
        rate: u32,
    ) -> Result<Self, TtsServiceError> {
        let text = normalize_text(text.as_ref());
        if text.is_empty() {
            return Err(TtsServiceError::InvalidRequest(
                "Text cannot be empty".to_string(),
            ));
        }
        if rate == 0 {
            return Err(TtsServiceError::InvalidRequest(
                "Rate must be a positive percentage".to_string(),
            ));
        }

        Ok(Self {
            text,
            voice,
            rate,
            sample_rate: None,
        })
    }

    /// Ask the backend for a specific output sample rate (Hz).
    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &VoiceProfile {
        &self.voice
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }
}

/// Describes one audio file that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    #[serde(rename = "file_path")]
    pub output_path: PathBuf,
    #[serde(rename = "text")]
    pub source_text: String,
    #[serde(rename = "voice")]
    pub voice_label: String,
}

/// Whether a batch writes one file per input or a single merged file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeStrategy {
    #[default]
    #[serde(rename = "separate")]
    PerInput,
    #[serde(rename = "single")]
    PerBatch,
}

impl MergeStrategy {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge {
            MergeStrategy::PerBatch
        } else {
            MergeStrategy::PerInput
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::PerInput => "separate",
            MergeStrategy::PerBatch => "single",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
