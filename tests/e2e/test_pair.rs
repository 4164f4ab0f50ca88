use crate::e2e::helpers;

use helpers::assertions::{
    assert_audio_file, assert_duration_close, decoded_duration, decoded_duration_of,
};
use helpers::fake_tts::FakeTtsRepository;
use helpers::TestContext;
use langlearn_polly::domain::tts::{allocate_filename, MergeStrategy, TtsServiceApi, TtsServiceError};
use langlearn_polly::infrastructure::repositories::BackendErrorKind;
use pretty_assertions::assert_eq;
use std::time::Duration;

fn expected_merge(texts: &[&str], pause_ms: u64) -> Duration {
    let speech: Duration = texts
        .iter()
        .map(|text| decoded_duration_of(&FakeTtsRepository::audio_for(text)))
        .sum();
    let gaps = texts.len().saturating_sub(1) as u32;
    speech + Duration::from_millis(pause_ms) * gaps
}

#[tokio::test]
async fn it_should_synthesize_a_bilingual_pair() {
    let ctx = TestContext::new();
    let output_path = ctx.output_dir().join("strong.mp3");

    let result = ctx
        .service
        .synthesize_pair(
            "strong",
            ctx.request("strong", "joanna"),
            "stark",
            ctx.request("stark", "hans"),
            &output_path,
            500,
        )
        .await
        .unwrap();

    assert_eq!(result.output_path, output_path);
    assert_eq!(result.source_text, "strong | stark");
    assert_eq!(result.voice_label, "Joanna+Hans");
    assert_audio_file(&output_path);
    assert_duration_close(
        decoded_duration(&output_path),
        expected_merge(&["strong", "stark"], 500),
    );
}

#[tokio::test]
async fn it_should_label_a_same_voice_pair_positionally() {
    let ctx = TestContext::new();
    let output_path = ctx.output_dir().join("same.mp3");

    let result = ctx
        .service
        .synthesize_pair(
            "one",
            ctx.request("one", "joanna"),
            "two",
            ctx.request("two", "joanna"),
            &output_path,
            0,
        )
        .await
        .unwrap();

    assert_eq!(result.voice_label, "Joanna+Joanna");
}

#[tokio::test]
async fn it_should_write_one_merged_file_per_pair() {
    let ctx = TestContext::new();
    let output_dir = ctx.output_dir();

    let pairs = vec![
        (ctx.request("strong", "joanna"), ctx.request("stark", "hans")),
        (ctx.request("house", "joanna"), ctx.request("Haus", "hans")),
    ];
    let results = ctx
        .service
        .synthesize_pair_batch(pairs, &output_dir, MergeStrategy::PerInput, 500)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source_text, "strong | stark");
    assert_eq!(results[1].source_text, "house | Haus");
    assert_eq!(
        results[1].output_path,
        output_dir.join(allocate_filename("house | Haus", "pair_"))
    );

    for result in &results {
        assert_eq!(result.voice_label, "Joanna+Hans");
        assert_audio_file(&result.output_path);
    }
    assert_duration_close(
        decoded_duration(&results[0].output_path),
        expected_merge(&["strong", "stark"], 500),
    );
}

#[tokio::test]
async fn it_should_flatten_pairs_into_one_file_with_uniform_pauses() {
    let ctx = TestContext::new();
    let output_dir = ctx.output_dir();

    let pairs = vec![
        (ctx.request("strong", "joanna"), ctx.request("stark", "hans")),
        (ctx.request("house", "joanna"), ctx.request("Haus", "hans")),
        (ctx.request("dog", "joanna"), ctx.request("Hund", "hans")),
    ];
    let results = ctx
        .service
        .synthesize_pair_batch(pairs, &output_dir, MergeStrategy::PerBatch, 300)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let merged = &results[0];
    assert_eq!(merged.source_text, "strong | stark | house | Haus | dog | Hund");
    assert_eq!(merged.voice_label, "Joanna+Hans");
    assert_eq!(
        ctx.backend.calls(),
        vec!["strong", "stark", "house", "Haus", "dog", "Hund"]
    );

    // 3 pairs -> 6 segments -> 5 gaps of the same length
    assert_duration_close(
        decoded_duration(&merged.output_path),
        expected_merge(&["strong", "stark", "house", "Haus", "dog", "Hund"], 300),
    );
}

#[tokio::test]
async fn it_should_report_the_flattened_index_of_a_failing_pair_text() {
    let ctx = TestContext::with_backend(
        FakeTtsRepository::failing_on("Haus", BackendErrorKind::Unsupported),
        false,
    );

    let pairs = vec![
        (ctx.request("strong", "joanna"), ctx.request("stark", "hans")),
        (ctx.request("house", "joanna"), ctx.request("Haus", "hans")),
    ];
    let err = ctx
        .service
        .synthesize_pair_batch(pairs, &ctx.output_dir(), MergeStrategy::PerInput, 500)
        .await
        .unwrap_err();

    match err {
        TtsServiceError::Backend { index, text, source } => {
            assert_eq!(index, 3);
            assert_eq!(text, "Haus");
            assert_eq!(source.kind, BackendErrorKind::Unsupported);
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}
