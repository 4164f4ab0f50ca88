use langlearn_polly::infrastructure::audio::AudioSegment;
use std::path::Path;
use std::time::Duration;

/// Slack for encoder delay and frame padding added by each MP3 round trip
pub const CODEC_TOLERANCE: Duration = Duration::from_millis(250);

pub fn assert_audio_file(path: &Path) {
    let metadata = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("Missing audio file {}: {e}", path.display()));
    assert!(metadata.len() > 0, "Audio file {} is empty", path.display());
}

/// Decoded duration of an MP3 file
pub fn decoded_duration(path: &Path) -> Duration {
    let bytes = std::fs::read(path).expect("Failed to read audio file");
    decoded_duration_of(&bytes)
}

pub fn decoded_duration_of(bytes: &[u8]) -> Duration {
    AudioSegment::decode(bytes)
        .expect("Audio does not decode")
        .duration()
}

pub fn assert_duration_close(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= CODEC_TOLERANCE,
        "Expected duration ~{expected:?}, got {actual:?}"
    );
}
