use super::error::TtsServiceError;
use super::filename::allocate_filename;
use super::model::{
    MergeStrategy, SynthesisRequest, SynthesisResult, TEXT_DELIMITER, VOICE_DELIMITER,
};
use crate::infrastructure::audio::AudioAssembler;
use crate::infrastructure::repositories::{BackendError, BackendErrorKind, TtsRepository};
use async_trait::async_trait;
use moka::future::Cache;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prefix of a merged per-input unit in a pair batch
const PAIR_PREFIX: &str = "pair_";
/// Prefix of the single merged file of a text batch
const BATCH_PREFIX: &str = "batch_";
/// Prefix of the single merged file of a pair batch
const PAIR_BATCH_PREFIX: &str = "pairs_";

/// How the voices of a merged output are labelled
#[derive(Debug, Clone, Copy)]
enum VoiceLabel {
    /// Every request's voice, in order ("Joanna+Hans")
    Positional,
    /// Each voice once, in order of first use
    Distinct,
}

/// Naming and labelling rules for one public operation
#[derive(Debug, Clone, Copy)]
struct OutputPlan {
    unit_prefix: &'static str,
    unit_label: VoiceLabel,
    batch_prefix: &'static str,
}

impl OutputPlan {
    const TEXTS: OutputPlan = OutputPlan {
        unit_prefix: "",
        unit_label: VoiceLabel::Distinct,
        batch_prefix: BATCH_PREFIX,
    };

    const PAIRS: OutputPlan = OutputPlan {
        unit_prefix: PAIR_PREFIX,
        unit_label: VoiceLabel::Positional,
        batch_prefix: PAIR_BATCH_PREFIX,
    };
}

/// Orchestrates synthesis: calls the backend for each text in order, merges
/// segments when asked to and writes the audio files.
pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
    assembler: AudioAssembler,
    cache: Option<Cache<String, Vec<u8>>>,
}

impl TtsService {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, cache_enabled: bool) -> Self {
        // Identical requests inside one run reuse the first response
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(256)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            tts_repo,
            assembler: AudioAssembler::new(),
            cache,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize one request straight to `output_path`.
    ///
    /// The backend's MP3 bytes are written as-is, without re-encoding.
    async fn synthesize_one(
        &self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<SynthesisResult, TtsServiceError>;

    /// Synthesize a batch of requests into `output_dir`.
    ///
    /// - `PerInput`: one file per request, named after the request's text
    /// - `PerBatch`: one file holding every request in input order with
    ///   `pause_ms` of silence between neighbours
    ///
    /// The directory is created before the first backend call. The first
    /// failure aborts the batch; files written before it stay on disk.
    async fn synthesize_batch(
        &self,
        requests: Vec<SynthesisRequest>,
        output_dir: &Path,
        strategy: MergeStrategy,
        pause_ms: u32,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError>;

    /// Synthesize two texts into one file at `output_path`:
    /// `[text1] [pause] [text2]`, labelled `voice1+voice2`.
    async fn synthesize_pair(
        &self,
        text1: &str,
        request1: SynthesisRequest,
        text2: &str,
        request2: SynthesisRequest,
        output_path: &Path,
        pause_ms: u32,
    ) -> Result<SynthesisResult, TtsServiceError>;

    /// Synthesize a batch of pairs into `output_dir`.
    ///
    /// - `PerInput`: one merged two-segment file per pair
    /// - `PerBatch`: every pair flattened in order into one file, with the
    ///   same `pause_ms` between all adjacent segments
    async fn synthesize_pair_batch(
        &self,
        pairs: Vec<(SynthesisRequest, SynthesisRequest)>,
        output_dir: &Path,
        strategy: MergeStrategy,
        pause_ms: u32,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize_one(
        &self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<SynthesisResult, TtsServiceError> {
        ensure_parent_dir(output_path).await?;
        self.synthesize_at(0, request, output_path).await
    }

    async fn synthesize_batch(
        &self,
        requests: Vec<SynthesisRequest>,
        output_dir: &Path,
        strategy: MergeStrategy,
        pause_ms: u32,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError> {
        let units = requests.into_iter().map(|request| vec![request]).collect();
        self.synthesize_units(units, output_dir, strategy, pause_ms, OutputPlan::TEXTS)
            .await
    }

    async fn synthesize_pair(
        &self,
        text1: &str,
        request1: SynthesisRequest,
        text2: &str,
        request2: SynthesisRequest,
        output_path: &Path,
        pause_ms: u32,
    ) -> Result<SynthesisResult, TtsServiceError> {
        ensure_parent_dir(output_path).await?;

        let requests = [request1, request2];
        self.merge_to_file(0, &requests, output_path, pause_ms).await?;

        Ok(SynthesisResult {
            output_path: output_path.to_path_buf(),
            source_text: [text1, text2].join(TEXT_DELIMITER),
            voice_label: voice_label(&requests, VoiceLabel::Positional),
        })
    }

    async fn synthesize_pair_batch(
        &self,
        pairs: Vec<(SynthesisRequest, SynthesisRequest)>,
        output_dir: &Path,
        strategy: MergeStrategy,
        pause_ms: u32,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError> {
        let units = pairs
            .into_iter()
            .map(|(first, second)| vec![first, second])
            .collect();
        self.synthesize_units(units, output_dir, strategy, pause_ms, OutputPlan::PAIRS)
            .await
    }
}

impl TtsService {
    /// Shared driver behind the batch operations.
    ///
    /// A unit is the group of requests that share one file under
    /// `PerInput`; `PerBatch` flattens all units into a single group. Inputs
    /// are processed strictly in order, so merged audio always follows input
    /// order.
    async fn synthesize_units(
        &self,
        units: Vec<Vec<SynthesisRequest>>,
        output_dir: &Path,
        strategy: MergeStrategy,
        pause_ms: u32,
        plan: OutputPlan,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError> {
        if units.is_empty() {
            return Err(TtsServiceError::InvalidBatchInput(
                "batch is empty".to_string(),
            ));
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| TtsServiceError::io(output_dir, e))?;

        let (groups, prefix, label) = match strategy {
            MergeStrategy::PerInput => (units, plan.unit_prefix, plan.unit_label),
            MergeStrategy::PerBatch => (
                vec![units.into_iter().flatten().collect::<Vec<_>>()],
                plan.batch_prefix,
                VoiceLabel::Distinct,
            ),
        };

        tracing::info!(
            strategy = %strategy,
            output_count = groups.len(),
            input_count = groups.iter().map(Vec::len).sum::<usize>(),
            output_dir = %output_dir.display(),
            pause_ms = pause_ms,
            "Starting batch synthesis"
        );

        let mut results = Vec::with_capacity(groups.len());
        let mut first_index = 0;

        for group in &groups {
            let source_text = composite_text(group);
            let output_path = output_dir.join(allocate_filename(&source_text, prefix));

            let result = if strategy == MergeStrategy::PerInput && group.len() == 1 {
                self.synthesize_at(first_index, &group[0], &output_path)
                    .await?
            } else {
                self.merge_to_file(first_index, group, &output_path, pause_ms)
                    .await?;
                SynthesisResult {
                    output_path,
                    source_text,
                    voice_label: voice_label(group, label),
                }
            };

            first_index += group.len();
            results.push(result);
        }

        Ok(results)
    }

    /// One backend call written straight to disk
    async fn synthesize_at(
        &self,
        index: usize,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<SynthesisResult, TtsServiceError> {
        let audio_data = self.fetch_audio(index, request).await?;
        write_audio(output_path, &audio_data).await?;

        Ok(SynthesisResult {
            output_path: output_path.to_path_buf(),
            source_text: request.text().to_string(),
            voice_label: request.voice().display_name.clone(),
        })
    }

    /// Synthesize every request in order, merge with `pause_ms` between
    /// segments and write the merged stream to `output_path`
    async fn merge_to_file(
        &self,
        first_index: usize,
        requests: &[SynthesisRequest],
        output_path: &Path,
        pause_ms: u32,
    ) -> Result<(), TtsServiceError> {
        let mut segments = Vec::with_capacity(requests.len());
        for (offset, request) in requests.iter().enumerate() {
            segments.push(self.fetch_audio(first_index + offset, request).await?);
        }

        // Decoding and encoding are CPU bound
        let assembler = self.assembler;
        let merged = tokio::task::spawn_blocking(move || assembler.assemble(&segments, pause_ms))
            .await
            .map_err(anyhow::Error::from)??;

        write_audio(output_path, &merged).await
    }

    /// Call the backend for one request (or reuse a cached response)
    async fn fetch_audio(
        &self,
        index: usize,
        request: &SynthesisRequest,
    ) -> Result<Vec<u8>, TtsServiceError> {
        let cache_key = cache_key(request);

        if let Some(cache) = &self.cache {
            if let Some(cached_audio) = cache.get(&cache_key).await {
                tracing::info!(
                    input_index = index,
                    voice = %request.voice().display_name,
                    cached_audio_size = cached_audio.len(),
                    "TTS cache hit - reusing synthesized audio"
                );
                return Ok(cached_audio);
            }
        }

        let start_time = Instant::now();
        tracing::info!(
            input_index = index,
            voice = %request.voice().display_name,
            engine = %request.voice().engine_tier,
            rate = request.rate(),
            text_length = request.text().len(),
            "Synthesizing input"
        );

        let backend_error = |source: BackendError| TtsServiceError::Backend {
            index,
            text: request.text().to_string(),
            source,
        };

        let audio_data = self
            .tts_repo
            .synthesize(request)
            .await
            .map_err(backend_error)?;

        if audio_data.is_empty() {
            return Err(backend_error(BackendError::new(
                BackendErrorKind::Other,
                "provider returned an empty audio stream",
            )));
        }

        tracing::info!(
            input_index = index,
            audio_size_bytes = audio_data.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Input synthesized"
        );

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, audio_data.clone()).await;
        }

        Ok(audio_data)
    }
}

fn cache_key(request: &SynthesisRequest) -> String {
    let voice = request.voice();
    format!(
        "{}|{}|{}|{}|{}|{}",
        voice.provider_voice_id,
        voice.language_code,
        voice.engine_tier,
        request.rate(),
        request.sample_rate().unwrap_or(0),
        request.text()
    )
}

fn composite_text(requests: &[SynthesisRequest]) -> String {
    requests
        .iter()
        .map(SynthesisRequest::text)
        .collect::<Vec<_>>()
        .join(TEXT_DELIMITER)
}

fn voice_label(requests: &[SynthesisRequest], label: VoiceLabel) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(requests.len());
    for request in requests {
        let name = request.voice().display_name.as_str();
        if matches!(label, VoiceLabel::Positional) || !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(VOICE_DELIMITER)
}

async fn ensure_parent_dir(path: &Path) -> Result<(), TtsServiceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TtsServiceError::io(parent, e)),
        _ => Ok(()),
    }
}

async fn write_audio(path: &Path, audio_data: &[u8]) -> Result<(), TtsServiceError> {
    tokio::fs::write(path, audio_data)
        .await
        .map_err(|e| TtsServiceError::io(path, e))?;

    tracing::info!(
        path = %path.display(),
        size_bytes = audio_data.len(),
        "Audio file written"
    );

    Ok(())
}
