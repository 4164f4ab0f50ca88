use super::tts_repository::{BackendError, BackendErrorKind, TtsRepository};
use crate::domain::tts::SynthesisRequest;
use async_trait::async_trait;
use aws_sdk_polly::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::synthesize_speech::SynthesizeSpeechError,
    types::{Engine, LanguageCode, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// Slowest prosody rate Polly accepts (percent)
pub const MIN_RATE: u32 = 20;
/// Fastest prosody rate Polly accepts (percent)
pub const MAX_RATE: u32 = 200;

/// Sample rates Polly can produce for MP3 output
pub const SUPPORTED_SAMPLE_RATES: &[u32] = &[8000, 16000, 22050, 24000];

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    sample_rate: u32,
}

impl PollyTtsRepository {
    /// `sample_rate` is requested for every call unless the request
    /// overrides it, so merged segments share one rate.
    pub fn new(polly_client: Arc<PollyClient>, sample_rate: u32) -> Self {
        Self {
            polly_client,
            sample_rate,
        }
    }

    /// Call AWS Polly to synthesize a single request
    async fn call_polly(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        let voice = request.voice();
        let rate = validate_rate(request.rate())?;
        let sample_rate = request.sample_rate().unwrap_or(self.sample_rate);
        let ssml = build_ssml(request.text(), rate);

        let voice_id = VoiceId::from(voice.provider_voice_id.as_str());
        let engine = Engine::from(voice.engine_tier.as_str());

        tracing::info!(
            voice = %voice.display_name,
            voice_id = ?voice_id,
            language = %voice.language_code,
            engine = ?engine,
            rate = rate,
            sample_rate = sample_rate,
            output_format = "Mp3",
            text_length = request.text().len(),
            text_preview = preview(request.text()),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(ssml)
            .text_type(TextType::Ssml)
            .voice_id(voice_id.clone())
            .language_code(LanguageCode::from(voice.language_code.as_str()))
            .engine(engine.clone())
            .output_format(OutputFormat::Mp3)
            .sample_rate(sample_rate.to_string())
            .send()
            .await
            .map_err(|e| {
                let kind = classify_sdk_error(&e);
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    kind = %kind,
                    voice_id = ?voice_id,
                    engine = ?engine,
                    text_length = request.text().len(),
                    "AWS Polly synthesize_speech failed"
                );
                BackendError::new(kind, format!("AWS Polly error: {}", DisplayErrorContext(&e)))
                    .with_cause(e)
            })?;

        tracing::debug!("AWS Polly synthesize_speech successful, reading audio stream");

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            BackendError::new(
                BackendErrorKind::Network,
                format!("Failed to read audio stream: {}", e),
            )
            .with_cause(e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        let start_time = std::time::Instant::now();

        let audio_data = self.call_polly(request).await?;

        let duration = start_time.elapsed();
        let characters_count = request.text().len();
        let throughput_chars_per_sec = if duration.as_secs_f64() > 0.0 {
            characters_count as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        tracing::info!(
            provider = "polly",
            latency_ms = duration.as_millis(),
            characters_count = characters_count,
            audio_size_bytes = audio_data.len(),
            throughput_chars_per_sec = format!("{:.2}", throughput_chars_per_sec),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}

fn validate_rate(rate: u32) -> Result<u32, BackendError> {
    if (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(BackendError::new(
            BackendErrorKind::InvalidInput,
            format!("rate {rate}% is outside Polly's range {MIN_RATE}%-{MAX_RATE}%"),
        ))
    }
}

/// Wrap text in SSML so the prosody rate applies
fn build_ssml(text: &str, rate: u32) -> String {
    format!(
        "<speak><prosody rate=\"{}%\">{}</prosody></speak>",
        rate,
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Map an SDK failure onto the backend error taxonomy
fn classify_sdk_error<R>(err: &SdkError<SynthesizeSpeechError, R>) -> BackendErrorKind {
    if matches!(err, SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)) {
        return BackendErrorKind::Network;
    }

    let Some(service_err) = err.as_service_error() else {
        return BackendErrorKind::Other;
    };

    if service_err.is_text_length_exceeded_exception()
        || service_err.is_invalid_ssml_exception()
        || service_err.is_invalid_sample_rate_exception()
        || service_err.is_lexicon_not_found_exception()
    {
        BackendErrorKind::InvalidInput
    } else if service_err.is_engine_not_supported_exception()
        || service_err.is_language_not_supported_exception()
    {
        BackendErrorKind::Unsupported
    } else if matches!(
        service_err.code(),
        Some("ThrottlingException" | "TooManyRequestsException")
    ) {
        BackendErrorKind::RateLimited
    } else {
        BackendErrorKind::Other
    }
}
