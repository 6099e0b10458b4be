//! Session setup
//!
//! Everything decided before the capture loop starts: observation-time
//! parsing, run-index detection against existing output files, and the
//! resulting immutable [`SessionConfig`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Suffix shared by all event-log files; the run-index scan keys off it.
pub const EVENT_FILE_SUFFIX: &str = "_ethoc.csv";
pub const SUMMARY_FILE_SUFFIX: &str = "_summary.csv";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("base name must not be empty")]
    EmptyBaseName,
    #[error("invalid observation time {0:?}: use HH:MM:SS or seconds")]
    InvalidTimeFormat(String),
    #[error("failed to scan output directory: {0}")]
    Scan(#[from] io::Error),
}

/// Parse an observation time given as `HH:MM:SS` or plain seconds.
pub fn parse_observation_time(input: &str) -> Result<u64, SessionError> {
    let invalid = || SessionError::InvalidTimeFormat(input.to_string());

    if input.contains(':') {
        let fields: Vec<&str> = input.split(':').collect();
        if fields.len() != 3 {
            return Err(invalid());
        }
        let mut parts = [0u64; 3];
        for (slot, field) in parts.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| invalid())?;
        }
        let [h, m, s] = parts;
        return Ok(h * 3600 + m * 60 + s);
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().map_err(|_| invalid());
    }
    Err(invalid())
}

/// Immutable per-run configuration, computed once before capture.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_name: String,
    /// `None` means unbounded (manual stop only).
    pub observation_secs: Option<u64>,
    pub output_dir: PathBuf,
    pub padding: usize,
    pub run_index: usize,
}

impl SessionConfig {
    /// Validate the inputs and scan `output_dir` for the next run index.
    /// An observation time of 0 is treated as unbounded.
    pub fn new(
        base_name: &str,
        observation_secs: Option<u64>,
        output_dir: &Path,
        padding: usize,
    ) -> Result<Self, SessionError> {
        if base_name.is_empty() {
            return Err(SessionError::EmptyBaseName);
        }
        let run_index = next_run_index(output_dir, base_name)?;
        Ok(Self {
            base_name: base_name.to_string(),
            observation_secs: observation_secs.filter(|secs| *secs > 0),
            output_dir: output_dir.to_path_buf(),
            padding: padding.max(1),
            run_index,
        })
    }

    fn file_stem(&self) -> String {
        format!(
            "{}_{:0width$}",
            self.base_name,
            self.run_index,
            width = self.padding
        )
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.file_stem(), EVENT_FILE_SUFFIX))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.file_stem(), SUMMARY_FILE_SUFFIX))
    }
}

/// Count prior runs sharing `base_name` in `dir`.
///
/// A file counts iff its name is exactly `{base_name}_{digits}_ethoc.csv`:
/// the character after the base name must be the run-index separator, so
/// `run2_0000_ethoc.csv` and `run_ethoc.csv` do not count for base `run`.
pub fn next_run_index(dir: &Path, base_name: &str) -> io::Result<usize> {
    let mut count = 0;
    for entry in dir.read_dir()? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if is_run_file(name, base_name) {
                count += 1;
            }
        }
    }
    Ok(count)
}

fn is_run_file(file_name: &str, base_name: &str) -> bool {
    file_name
        .strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(EVENT_FILE_SUFFIX))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}
