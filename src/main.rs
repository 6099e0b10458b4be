//! ethocount - terminal key-press timestamping for behavioral observation
//!
//! CLI glue: argument parsing, terminal setup/teardown, the capture run and
//! the final CSV writes. All timing logic lives in the library.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;

use ethocount::capture::{CaptureSession, MonotonicClock, TerminalInput};
use ethocount::config::Settings;
use ethocount::feedback::Feedback;
use ethocount::output::{write_event_log, write_summary};
use ethocount::runtime::run_capture;
use ethocount::session::{parse_observation_time, SessionConfig};

/// Record keystrokes for behavioral observation.
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Records a timestamp for each key press and stores two CSV files: one \
                  with every key-press event in milliseconds, one summing up how long \
                  each key was the active condition."
)]
struct Cli {
    /// base name for output files and existing-run detection
    #[clap(short = 'b', long)]
    base_name: String,

    /// duration of observation in seconds or HH:MM:SS (0 or absent runs
    /// until the stop key)
    #[clap(short = 't', long)]
    observation_time: Option<String>,

    /// where the output files are written
    #[clap(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// zero-padding width for the run index in file names
    #[clap(short = 'p', long, default_value_t = 4)]
    padding: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_default();

    let observation_secs = match cli
        .observation_time
        .as_deref()
        .map(parse_observation_time)
        .transpose()
    {
        Ok(secs) => secs,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    let config =
        match SessionConfig::new(&cli.base_name, observation_secs, &cli.output_dir, cli.padding) {
            Ok(config) => config,
            Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
        };

    info!(
        "run {} of base {:?}, writing to {}",
        config.run_index,
        config.base_name,
        config.output_dir.display()
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed))
            .context("failed to install signal handler")?;
    }

    let started_at = Local::now();
    let mut session = CaptureSession::new(config.observation_secs, settings.capture.stop_key);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let capture_result = {
        let clock = MonotonicClock::new();
        let mut input = TerminalInput;
        let mut feedback = Feedback::new(stdout(), settings.feedback.clone());
        feedback
            .banner(settings.capture.stop_key, config.observation_secs)
            .context("failed to write to terminal")
            .and_then(|()| {
                run_capture(
                    &mut input,
                    &mut session,
                    &clock,
                    &mut feedback,
                    settings.poll_interval(),
                    &interrupted,
                )
            })
    };

    // restore the terminal before reporting anything
    execute!(stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    capture_result?;

    let (log, summary) = session.into_outputs();
    if log.is_empty() && summary.is_empty() {
        println!("Nothing recorded; no files written.");
        return Ok(());
    }

    let event_path = config.event_log_path();
    let summary_path = config.summary_path();
    let event_count = log.len();

    write_event_log(&event_path, &log)
        .with_context(|| format!("failed to write event log {}", event_path.display()))?;
    info!("wrote event log {}", event_path.display());

    write_summary(&summary_path, &summary)
        .with_context(|| format!("failed to write summary {}", summary_path.display()))?;
    info!("wrote summary {}", summary_path.display());

    println!("Session started {}.", started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Recorded {event_count} events across {} conditions.", summary.len());
    println!("Event log: {}", event_path.display());
    println!("Summary:   {}", summary_path.display());

    Ok(())
}
