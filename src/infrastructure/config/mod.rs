use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::domain::tts::{VoiceProfile, VoiceRegistry, DEFAULT_PAUSE_MS, DEFAULT_RATE};
use crate::infrastructure::repositories::polly_tts_repository::SUPPORTED_SAMPLE_RATES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    InvalidVar { name: &'static str, reason: String },
    #[error("failed to read voices file {}: {source}", .path.display())]
    VoicesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("voices file {} is malformed: {source}", .path.display())]
    MalformedVoices {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub aws_region: String,
    pub log_format: LogFormat,
    /// Sample rate requested from Polly for every call
    pub polly_sample_rate: u32,
    /// JSON array of extra voice profiles layered over the built-in table
    pub voices_file: Option<PathBuf>,
    pub default_rate: u32,
    pub default_pause_ms: u32,
    // TTS Cache
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_region: "us-east-1".to_string(),
            log_format: LogFormat::Pretty,
            polly_sample_rate: 22050,
            voices_file: None,
            default_rate: DEFAULT_RATE,
            default_pause_ms: DEFAULT_PAUSE_MS,
            tts_cache_enabled: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let polly_sample_rate = parse_var("POLLY_SAMPLE_RATE", defaults.polly_sample_rate)?;
        if !SUPPORTED_SAMPLE_RATES.contains(&polly_sample_rate) {
            return Err(ConfigError::InvalidVar {
                name: "POLLY_SAMPLE_RATE",
                reason: format!(
                    "{polly_sample_rate} is not one of {:?}",
                    SUPPORTED_SAMPLE_RATES
                ),
            });
        }

        let config = Config {
            aws_region: env::var("AWS_REGION").unwrap_or(defaults.aws_region),
            log_format: env::var("LOG_FORMAT")
                .map(|s| match s.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })
                .unwrap_or(defaults.log_format),
            polly_sample_rate,
            voices_file: env::var("LANGLEARN_VOICES_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            default_rate: parse_var("LANGLEARN_DEFAULT_RATE", defaults.default_rate)?,
            default_pause_ms: parse_var("LANGLEARN_DEFAULT_PAUSE_MS", defaults.default_pause_ms)?,
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    /// Built-in voices plus any from `voices_file`
    pub fn voice_registry(&self) -> Result<VoiceRegistry, ConfigError> {
        let registry = VoiceRegistry::builtin();

        let Some(path) = &self.voices_file else {
            return Ok(registry);
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::VoicesFile {
            path: path.clone(),
            source,
        })?;
        let extra: Vec<VoiceProfile> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::MalformedVoices {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %path.display(),
            voice_count = extra.len(),
            "Loaded extra voice profiles"
        );

        Ok(registry.with_overrides(extra))
    }
}

fn parse_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|e| ConfigError::InvalidVar {
            name,
            reason: format!("{value:?}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}
