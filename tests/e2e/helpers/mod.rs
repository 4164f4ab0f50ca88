use langlearn_polly::domain::tts::{SynthesisRequest, TtsService, VoiceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub mod assertions;
pub mod fake_tts;

use fake_tts::FakeTtsRepository;

/// Per-test service wired to a fake backend and a scratch directory
pub struct TestContext {
    pub service: TtsService,
    pub backend: Arc<FakeTtsRepository>,
    pub registry: VoiceRegistry,
    dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_backend(FakeTtsRepository::new(), false)
    }

    pub fn with_backend(backend: FakeTtsRepository, cache_enabled: bool) -> Self {
        let backend = Arc::new(backend);
        let service = TtsService::new(backend.clone(), cache_enabled);

        Self {
            service,
            backend,
            registry: VoiceRegistry::builtin(),
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Output directory for the test (not created until the service needs it)
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn request(&self, text: &str, voice: &str) -> SynthesisRequest {
        let profile = self.registry.resolve(voice).expect("Unknown test voice").clone();
        SynthesisRequest::new(text, profile, 75).expect("Invalid test request")
    }

    pub fn requests(&self, texts: &[&str], voice: &str) -> Vec<SynthesisRequest> {
        texts.iter().map(|text| self.request(text, voice)).collect()
    }
}
