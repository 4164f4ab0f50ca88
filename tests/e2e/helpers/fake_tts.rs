use async_trait::async_trait;
use langlearn_polly::domain::tts::SynthesisRequest;
use langlearn_polly::infrastructure::audio::{encode_mp3, AudioSegment};
use langlearn_polly::infrastructure::repositories::{BackendError, BackendErrorKind, TtsRepository};
use parking_lot::Mutex;
use std::time::Duration;

pub const FAKE_SAMPLE_RATE: u32 = 22050;

/// Stand-in for Polly: returns silence whose length depends on the text,
/// records every call in order and can be told to fail on a given text.
pub struct FakeTtsRepository {
    calls: Mutex<Vec<String>>,
    fail_on: Option<(String, BackendErrorKind)>,
    empty_audio: bool,
}

impl FakeTtsRepository {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            empty_audio: false,
        }
    }

    pub fn failing_on(text: &str, kind: BackendErrorKind) -> Self {
        Self {
            fail_on: Some((text.to_string(), kind)),
            ..Self::new()
        }
    }

    pub fn returning_empty_audio() -> Self {
        Self {
            empty_audio: true,
            ..Self::new()
        }
    }

    /// Texts the backend was called with, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Length of the audio the fake produces for `text`
    pub fn spoken_duration(text: &str) -> Duration {
        Duration::from_millis(200 + 10 * text.chars().count() as u64)
    }

    /// The exact bytes the fake returns for `text`
    pub fn audio_for(text: &str) -> Vec<u8> {
        let millis = Self::spoken_duration(text).as_millis() as u32;
        encode_mp3(&AudioSegment::silence(millis, FAKE_SAMPLE_RATE, 1))
            .expect("Failed to encode fake audio")
    }
}

#[async_trait]
impl TtsRepository for FakeTtsRepository {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        self.calls.lock().push(request.text().to_string());

        if let Some((text, kind)) = &self.fail_on {
            if request.text() == text {
                return Err(BackendError::new(*kind, format!("fake failure on {text:?}")));
            }
        }

        if self.empty_audio {
            return Ok(Vec::new());
        }

        Ok(Self::audio_for(request.text()))
    }
}
