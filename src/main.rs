use clap::Parser;
use langlearn_polly::cli::{self, Cli, Command};
use langlearn_polly::domain::tts::TtsService;
use langlearn_polly::error::AppResult;
use langlearn_polly::infrastructure::config::{Config, LogFormat};
use langlearn_polly::infrastructure::repositories::PollyTtsRepository;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, exit_code = err.exit_code(), "Command failed");
            eprintln!("Error: {err}");
            err.into()
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config, cli.verbose);

    let registry = config.voice_registry()?;

    if let Command::Voices = cli.command {
        return cli::print_voices(&registry, &mut std::io::stdout().lock());
    }

    // Validate all input before touching AWS
    let Some(job) = cli::prepare(cli.command, &registry, &config).await? else {
        return Ok(());
    };

    // Create AWS Polly client
    tracing::debug!("Initializing AWS Polly client with region: {}", config.aws_region);

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    tracing::debug!(
        region = ?aws_config.region(),
        "AWS configuration loaded"
    );

    let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));

    // === DEPENDENCY INJECTION SETUP ===
    let tts_repo = Arc::new(PollyTtsRepository::new(
        polly_client,
        config.polly_sample_rate,
    ));
    let tts_service = TtsService::new(tts_repo, config.tts_cache_enabled);

    let results = cli::execute(job, &tts_service).await?;
    cli::print_results(&results, cli.json, &mut std::io::stdout().lock())
}

fn init_logging(config: &Config, verbose: bool) {
    let default_filter = if verbose {
        "langlearn_polly=debug"
    } else {
        "langlearn_polly=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // stdout carries results only; logs go to stderr
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
