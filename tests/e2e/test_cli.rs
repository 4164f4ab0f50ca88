use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("langlearn-polly").expect("binary should build");
    cmd.env_remove("LANGLEARN_VOICES_FILE")
        .env_remove("POLLY_SAMPLE_RATE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn it_should_show_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("langlearn-polly"));
}

#[test]
fn it_should_mention_voice_in_synthesize_help() {
    cli()
        .args(["synthesize", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--voice"));
}

#[test]
fn it_should_accept_verbose_flag() {
    cli().args(["-v", "--help"]).assert().success();
}

#[test]
fn it_should_list_voices() {
    cli()
        .arg("voices")
        .assert()
        .success()
        .stdout(predicate::str::contains("joanna"))
        .stdout(predicate::str::contains("seoyeon"));
}

#[test]
fn it_should_reject_an_unknown_voice_before_calling_aws() {
    cli()
        .args(["synthesize", "hello", "--voice", "nonexistent"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown voice 'nonexistent'"));
}

#[test]
fn it_should_reject_a_malformed_pair_batch_file() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(input, r#"[["strong", "stark"], ["house"]]"#).unwrap();

    cli()
        .args(["synthesize-pair-batch"])
        .arg(input.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("entry 1"));
}

#[test]
fn it_should_reject_an_invalid_sample_rate() {
    cli()
        .env("POLLY_SAMPLE_RATE", "44100")
        .arg("voices")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("POLLY_SAMPLE_RATE"));
}
