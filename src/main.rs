use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use voicewire::audio::wav::{read_wav, sine_tone};
use voicewire::cli::{Cli, Commands};
use voicewire::config::Config;
use voicewire::defaults;
use voicewire::harness::run_streaming;
use voicewire::rest::RestClient;
use voicewire::stream::client::SttClient;
use voicewire::stream::diagnostic::DiagnosticSession;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?.with_env_overrides();
    if let Some(language) = cli.language {
        config.stream.language_code = language;
    }
    if let Some(model) = cli.model {
        config.stream.model = model;
    }
    config.validate()?;

    match cli.command {
        Commands::Stream {
            file,
            tone,
            seconds,
        } => run_stream(&config, file.as_deref(), tone, seconds).await,
        Commands::Transcribe { file } => run_transcribe(&config, &file).await,
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "voicewire=debug,info",
        _ => "voicewire=trace,debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run_stream(
    config: &Config,
    file: Option<&Path>,
    tone: bool,
    seconds: Option<u32>,
) -> Result<()> {
    let max_secs = seconds.unwrap_or(config.harness.max_stream_secs);
    let (audio, from_file) = match (file, tone) {
        (Some(path), _) => {
            let audio = read_wav(path, Some(max_secs))
                .with_context(|| format!("failed to read {}", path.display()))?;
            (audio, true)
        }
        (None, _) => {
            // No file given: fall back to the synthetic tone source.
            let audio = sine_tone(
                defaults::TONE_FREQUENCY_HZ,
                defaults::TONE_DURATION_SECS,
                config.stream.sample_rate,
            );
            (audio, false)
        }
    };

    println!(
        "Streaming {}ms of audio at {}Hz ({} model, {})...",
        audio.duration_ms(),
        audio.format.sample_rate,
        config.stream.model,
        config.stream.language_code
    );

    let mut stream_config = config.clone();
    stream_config.stream.sample_rate = audio.format.sample_rate;

    let client = SttClient::new(&stream_config)?;
    let stream = client.stream().await?;
    let mut session = DiagnosticSession::new(stream);

    let report = run_streaming(
        &mut session,
        &audio,
        stream_config.stream.chunk_duration_ms,
        &stream_config.harness,
    )
    .await?;

    println!();
    println!(
        "Events received: {} ({} transcript segments, {} signals, {} errors, {} unknown)",
        report.events_total,
        report.transcripts.len(),
        report.signals.len(),
        report.service_errors,
        report.unknown_events
    );

    if report.has_transcript() {
        println!("Transcript: {}", report.transcript());
        println!("PASS");
    } else {
        println!("Transcript: (none)");
        if from_file {
            println!("FAIL");
            bail!("no transcript received for file audio");
        }
        // A recognizer may legitimately hear nothing in a pure tone.
        println!("PASS (synthetic tone, empty transcript is acceptable)");
    }

    Ok(())
}

async fn run_transcribe(config: &Config, file: &Path) -> Result<()> {
    let client = RestClient::new(config)?;
    let response = client
        .transcribe_file(file)
        .await
        .with_context(|| format!("failed to transcribe {}", file.display()))?;

    if response.transcript.trim().is_empty() {
        println!("Transcript: (empty)");
        bail!("service returned an empty transcript");
    }

    println!("Transcript: {}", response.transcript);
    Ok(())
}
