use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use beatpulse::{AppConfig, BeatDetector, BeatEngine, BeatEvent};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "beatpulse_cli", about = "Beat detection over WAV files or live input")]
struct Cli {
    /// Optional JSON config file (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect beats in a WAV file and print them
    Analyze {
        /// Input WAV file (first channel is analyzed)
        input: PathBuf,
        /// Emit one JSON object per beat instead of text
        #[arg(long)]
        json: bool,
    },
    /// Capture from the default input device and print beats as they fire
    Listen {
        /// Stop after this many seconds (runs until interrupted if omitted)
        #[arg(long)]
        duration: Option<u64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Analyze { input, json } => run_analyze(&config, &input, json),
        Commands::Listen { duration } => run_listen(config, duration),
    }
}

fn run_analyze(config: &AppConfig, input: &PathBuf, json: bool) -> Result<ExitCode> {
    let (samples, sample_rate) = read_wav_mono(input)?;
    let mut detector = BeatDetector::new(&config.detector, sample_rate)
        .context("building detector from config")?;

    let frame_size = detector.frame_size();
    let mut events = Vec::new();

    // The final partial frame is zero-padded by the detector
    for frame in samples.chunks(frame_size) {
        if let Some(event) = detector.process(frame) {
            events.push(event);
        }
    }

    if json {
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
    } else {
        emit_report(input, sample_rate, &samples, &events)?;
    }

    Ok(ExitCode::from(0))
}

fn run_listen(config: AppConfig, duration: Option<u64>) -> Result<ExitCode> {
    let mut engine = BeatEngine::new(config);
    let mut rx = engine.subscribe();

    engine
        .start()
        .context("starting capture (is an input device available?)")?;
    eprintln!("Listening... beats print below");

    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }

        match rx.try_recv() {
            Ok(event) => println!(
                "beat @ {:>8} ms  energy {:.4}  threshold {:.4}",
                event.timestamp_ms, event.energy, event.threshold
            ),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(skipped)) => {
                eprintln!("(lagged: {skipped} beats dropped)");
            }
            Err(tokio::sync::broadcast::error::TryRecvError::Closed) => break,
        }
    }

    engine.stop();
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    input: String,
    sample_rate: u32,
    duration_secs: f64,
    beat_count: usize,
    beats: &'a [BeatEvent],
}

fn emit_report(
    input: &PathBuf,
    sample_rate: u32,
    samples: &[f32],
    events: &[BeatEvent],
) -> Result<()> {
    let duration_secs = samples.len() as f64 / sample_rate as f64;
    println!(
        "{}: {:.2}s at {} Hz, {} beats",
        input.display(),
        duration_secs,
        sample_rate,
        events.len()
    );
    for event in events {
        println!(
            "  beat @ {:>8} ms  energy {:.4}  threshold {:.4}",
            event.timestamp_ms, event.energy, event.threshold
        );
    }
    Ok(())
}

/// Decode a WAV file to mono f32, taking the first channel
fn read_wav_mono(path: &PathBuf) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<std::result::Result<_, _>>()
            .context("decoding float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .context("decoding integer samples")?
        }
    };

    Ok((samples, spec.sample_rate))
}
