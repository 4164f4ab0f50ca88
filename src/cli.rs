use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::tts::{
    allocate_filename, parse_pair_batch, parse_text_batch, MergeStrategy, SynthesisRequest,
    SynthesisResult, TtsServiceApi, VoiceRegistry, TEXT_DELIMITER,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::Config;

/// langlearn-polly: AWS Polly TTS for language learning.
#[derive(Debug, Parser)]
#[command(name = "langlearn-polly")]
#[command(version)]
#[command(about = "langlearn-polly: AWS Polly TTS for language learning.")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as a JSON array instead of one path per line.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize a single text to an MP3 file.
    Synthesize {
        text: String,

        /// Voice name (e.g. joanna, hans, tatyana, seoyeon).
        #[arg(long, default_value = "joanna")]
        voice: String,

        /// Speech rate as percentage (e.g. 75 = 75% speed).
        #[arg(long)]
        rate: Option<u32>,

        /// Output file path. Defaults to a name derived from the text in the current directory.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Synthesize a batch of texts from a JSON file.
    ///
    /// INPUT_FILE should contain a JSON array of strings, e.g.
    /// ["hello", "world", "good morning"]
    SynthesizeBatch {
        input_file: PathBuf,

        /// Voice name for all texts.
        #[arg(long, default_value = "joanna")]
        voice: String,

        /// Speech rate as percentage.
        #[arg(long)]
        rate: Option<u32>,

        /// Output directory. Defaults to the current directory.
        #[arg(short = 'd', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Merge all outputs into a single file.
        #[arg(long)]
        merge: bool,

        /// Pause between segments in ms (used with --merge).
        #[arg(long)]
        pause: Option<u32>,
    },

    /// Synthesize a pair of texts and stitch them with a pause.
    ///
    /// Creates [TEXT1 audio] [pause] [TEXT2 audio] in a single MP3.
    SynthesizePair {
        text1: String,
        text2: String,

        /// Voice for the first text (typically English).
        #[arg(long, default_value = "joanna")]
        voice1: String,

        /// Voice for the second text (typically L2).
        #[arg(long, default_value = "hans")]
        voice2: String,

        /// Speech rate as percentage.
        #[arg(long)]
        rate: Option<u32>,

        /// Pause between the two texts in ms.
        #[arg(long)]
        pause: Option<u32>,

        /// Output file path.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Synthesize a batch of text pairs from a JSON file.
    ///
    /// INPUT_FILE should contain a JSON array of [text1, text2] pairs, e.g.
    /// [["strong", "stark"], ["house", "Haus"]]
    SynthesizePairBatch {
        input_file: PathBuf,

        /// Voice for first texts (typically English).
        #[arg(long, default_value = "joanna")]
        voice1: String,

        /// Voice for second texts (typically L2).
        #[arg(long, default_value = "hans")]
        voice2: String,

        /// Speech rate as percentage.
        #[arg(long)]
        rate: Option<u32>,

        /// Pause between pair segments in ms.
        #[arg(long)]
        pause: Option<u32>,

        /// Output directory. Defaults to the current directory.
        #[arg(short = 'd', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Merge all pair outputs into a single file.
        #[arg(long)]
        merge: bool,
    },

    /// List the available voices.
    Voices,
}

/// A fully validated unit of work, ready for the service
#[derive(Debug)]
pub enum Job {
    Single {
        request: SynthesisRequest,
        output: PathBuf,
    },
    Batch {
        requests: Vec<SynthesisRequest>,
        output_dir: PathBuf,
        strategy: MergeStrategy,
        pause_ms: u32,
    },
    Pair {
        request1: SynthesisRequest,
        request2: SynthesisRequest,
        output: PathBuf,
        pause_ms: u32,
    },
    PairBatch {
        pairs: Vec<(SynthesisRequest, SynthesisRequest)>,
        output_dir: PathBuf,
        strategy: MergeStrategy,
        pause_ms: u32,
    },
}

/// Resolve voices, read batch files and build every request.
///
/// Runs before any provider client exists, so bad input never costs a call.
/// Returns `None` for commands that need no synthesis.
pub async fn prepare(
    command: Command,
    registry: &VoiceRegistry,
    config: &Config,
) -> AppResult<Option<Job>> {
    let job = match command {
        Command::Synthesize {
            text,
            voice,
            rate,
            output,
        } => {
            let profile = registry.resolve(&voice)?.clone();
            let request = SynthesisRequest::new(&text, profile, rate.unwrap_or(config.default_rate))?;
            let output = output.unwrap_or_else(|| {
                PathBuf::from(allocate_filename(
                    request.text(),
                    &format!("{}_", voice.to_lowercase()),
                ))
            });
            Job::Single { request, output }
        }
        Command::SynthesizeBatch {
            input_file,
            voice,
            rate,
            output_dir,
            merge,
            pause,
        } => {
            let profile = registry.resolve(&voice)?;
            let rate = rate.unwrap_or(config.default_rate);
            let texts = parse_text_batch(&read_input(&input_file).await?)?;
            let requests = texts
                .iter()
                .map(|text| SynthesisRequest::new(text, profile.clone(), rate))
                .collect::<Result<Vec<_>, _>>()?;

            Job::Batch {
                requests,
                output_dir: output_dir.unwrap_or_else(|| PathBuf::from(".")),
                strategy: MergeStrategy::from_merge_flag(merge),
                pause_ms: pause.unwrap_or(config.default_pause_ms),
            }
        }
        Command::SynthesizePair {
            text1,
            text2,
            voice1,
            voice2,
            rate,
            pause,
            output,
        } => {
            let profile1 = registry.resolve(&voice1)?.clone();
            let profile2 = registry.resolve(&voice2)?.clone();
            let rate = rate.unwrap_or(config.default_rate);
            let request1 = SynthesisRequest::new(&text1, profile1, rate)?;
            let request2 = SynthesisRequest::new(&text2, profile2, rate)?;
            let output = output.unwrap_or_else(|| {
                let composite = [request1.text(), request2.text()].join(TEXT_DELIMITER);
                PathBuf::from(allocate_filename(&composite, "pair_"))
            });

            Job::Pair {
                request1,
                request2,
                output,
                pause_ms: pause.unwrap_or(config.default_pause_ms),
            }
        }
        Command::SynthesizePairBatch {
            input_file,
            voice1,
            voice2,
            rate,
            pause,
            output_dir,
            merge,
        } => {
            let profile1 = registry.resolve(&voice1)?;
            let profile2 = registry.resolve(&voice2)?;
            let rate = rate.unwrap_or(config.default_rate);
            let raw_pairs = parse_pair_batch(&read_input(&input_file).await?)?;
            let pairs = raw_pairs
                .iter()
                .map(|(first, second)| -> AppResult<_> {
                    Ok((
                        SynthesisRequest::new(first, profile1.clone(), rate)?,
                        SynthesisRequest::new(second, profile2.clone(), rate)?,
                    ))
                })
                .collect::<AppResult<Vec<_>>>()?;

            Job::PairBatch {
                pairs,
                output_dir: output_dir.unwrap_or_else(|| PathBuf::from(".")),
                strategy: MergeStrategy::from_merge_flag(merge),
                pause_ms: pause.unwrap_or(config.default_pause_ms),
            }
        }
        Command::Voices => return Ok(None),
    };

    Ok(Some(job))
}

/// Run a prepared job against the service
pub async fn execute(job: Job, service: &dyn TtsServiceApi) -> AppResult<Vec<SynthesisResult>> {
    let results = match job {
        Job::Single { request, output } => vec![service.synthesize_one(&request, &output).await?],
        Job::Batch {
            requests,
            output_dir,
            strategy,
            pause_ms,
        } => {
            service
                .synthesize_batch(requests, &output_dir, strategy, pause_ms)
                .await?
        }
        Job::Pair {
            request1,
            request2,
            output,
            pause_ms,
        } => {
            let text1 = request1.text().to_string();
            let text2 = request2.text().to_string();
            vec![
                service
                    .synthesize_pair(&text1, request1, &text2, request2, &output, pause_ms)
                    .await?,
            ]
        }
        Job::PairBatch {
            pairs,
            output_dir,
            strategy,
            pause_ms,
        } => {
            service
                .synthesize_pair_batch(pairs, &output_dir, strategy, pause_ms)
                .await?
        }
    };

    Ok(results)
}

/// One path per line, or a JSON array with `json`
pub fn print_results(
    results: &[SynthesisResult],
    json: bool,
    out: &mut impl Write,
) -> AppResult<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, results)?;
        writeln!(out)?;
    } else {
        for result in results {
            writeln!(out, "{}", result.output_path.display())?;
        }
    }
    Ok(())
}

pub fn print_voices(registry: &VoiceRegistry, out: &mut impl Write) -> AppResult<()> {
    for (name, profile) in registry.iter() {
        writeln!(
            out,
            "{:<10} {:<10} {:<7} {}",
            name, profile.provider_voice_id, profile.language_code, profile.engine_tier
        )?;
    }
    Ok(())
}

async fn read_input(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Input {
            path: path.to_path_buf(),
            source,
        })
}
