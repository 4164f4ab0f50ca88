//! Decoding, concatenation and re-encoding of MP3 audio.
//!
//! Segments are decoded to interleaved 16-bit PCM with symphonia, joined in
//! memory with silence between them, and encoded back to MP3 with LAME.

mod segment;

pub use segment::AudioSegment;

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};
use std::time::Instant;

/// Bitrate of re-encoded output; plenty for speech
const OUTPUT_BITRATE: Bitrate = Bitrate::Kbps64;

/// Extra room LAME may need when flushing its internal buffers
const FLUSH_HEADROOM: usize = 7200;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to decode audio segment #{index}: {reason}")]
    Decode { index: usize, reason: String },
    #[error("failed to encode audio: {0}")]
    Encode(String),
    #[error("no audio segments to assemble")]
    Empty,
}

/// Joins encoded segments into one MP3 stream with silence between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioAssembler;

impl AudioAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Decode every segment in order, insert `silence_ms` of silence between
    /// adjacent segments and encode the result.
    ///
    /// The output takes the sample rate and channel layout of the first
    /// segment; later segments that differ are converted to it. A single
    /// segment is still decoded and re-encoded, with no silence added.
    pub fn assemble(&self, segments: &[Vec<u8>], silence_ms: u32) -> Result<Vec<u8>, AudioError> {
        let start_time = Instant::now();

        let mut decoded = segments
            .iter()
            .enumerate()
            .map(|(index, bytes)| AudioSegment::decode_indexed(bytes, index));

        let mut accumulator = decoded.next().ok_or(AudioError::Empty)??;
        let (sample_rate, channels) = (accumulator.sample_rate(), accumulator.channels());
        let silence = AudioSegment::silence(silence_ms, sample_rate, channels);

        for segment in decoded {
            let segment = segment?.conform(sample_rate, channels);
            accumulator.append(&silence);
            accumulator.append(&segment);
        }

        let encoded = encode_mp3(&accumulator)?;

        tracing::debug!(
            segment_count = segments.len(),
            silence_ms = silence_ms,
            sample_rate = sample_rate,
            channels = channels,
            duration_ms = accumulator.duration().as_millis(),
            output_size = encoded.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio segments assembled"
        );

        Ok(encoded)
    }
}

/// Encode a PCM segment as MP3 at its own sample rate and channel layout
pub fn encode_mp3(segment: &AudioSegment) -> Result<Vec<u8>, AudioError> {
    let channels = segment.channels();
    if !(1..=2).contains(&channels) {
        return Err(AudioError::Encode(format!(
            "unsupported channel count {channels}"
        )));
    }

    let mut builder = Builder::new()
        .ok_or_else(|| AudioError::Encode("failed to allocate LAME encoder".to_string()))?;
    builder.set_num_channels(channels as u8).map_err(encode_error)?;
    builder
        .set_sample_rate(segment.sample_rate())
        .map_err(encode_error)?;
    builder.set_brate(OUTPUT_BITRATE).map_err(encode_error)?;
    builder.set_quality(Quality::Good).map_err(encode_error)?;
    let mut encoder = builder.build().map_err(encode_error)?;

    let samples = segment.samples();
    let mut output = Vec::new();
    output.reserve(mp3lame_encoder::max_required_buffer_size(segment.frames()));

    if channels == 1 {
        encoder
            .encode_to_vec(MonoPcm(samples), &mut output)
            .map_err(encode_error)?;
    } else {
        encoder
            .encode_to_vec(InterleavedPcm(samples), &mut output)
            .map_err(encode_error)?;
    }

    output.reserve(FLUSH_HEADROOM);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut output)
        .map_err(encode_error)?;

    if output.is_empty() {
        return Err(AudioError::Encode("encoder produced no output".to_string()));
    }

    Ok(output)
}

fn encode_error(err: impl std::fmt::Debug) -> AudioError {
    AudioError::Encode(format!("{err:?}"))
}
