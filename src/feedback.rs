//! Terminal feedback
//!
//! Thin presentation layer rendered after each state-machine transition. The
//! machine itself never touches the terminal; everything user-visible goes
//! through here, generic over `Write` so it can render into a buffer in
//! tests. Output uses `\r\n` because the terminal is in raw mode.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Print, SetAttribute},
};

use crate::config::FeedbackSettings;

const BELL: &str = "\x07";

/// Render elapsed milliseconds as the `(seconds, milliseconds)` display pair,
/// e.g. 1045 → ("1", "045") and 45 → ("0", "45").
pub fn format_elapsed(elapsed_ms: u64) -> (String, String) {
    let digits = elapsed_ms.to_string();
    if digits.len() > 3 {
        let (secs, millis) = digits.split_at(digits.len() - 3);
        (secs.to_string(), millis.to_string())
    } else {
        ("0".to_string(), digits)
    }
}

pub struct Feedback<W: Write> {
    out: W,
    settings: FeedbackSettings,
}

impl<W: Write> Feedback<W> {
    pub fn new(out: W, settings: FeedbackSettings) -> Self {
        Self { out, settings }
    }

    /// Consume the layer and return the underlying writer.
    pub fn into_out(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text), Print("\r\n"))?;
        self.out.flush()
    }

    /// Instruction banner shown before the first key press.
    pub fn banner(&mut self, stop_key: char, observation_secs: Option<u64>) -> io::Result<()> {
        self.line(
            "Press any alphanumeric key to start recording. Each press is shown \
             here and stored with its time point in milliseconds. Millisecond \
             accuracy depends on your system.",
        )?;
        match observation_secs {
            Some(secs) => self.line(&format!(
                "Recording stops after {secs} seconds, or earlier with Shift+{stop_key}."
            )),
            None => self.line(&format!("Press Shift+{stop_key} to stop and save the output.")),
        }
    }

    pub fn started(&mut self, key: char) -> io::Result<()> {
        self.line(&format!("Detected initial key: {key}"))
    }

    pub fn key_logged(&mut self, key: char, elapsed_ms: u64) -> io::Result<()> {
        let (secs, millis) = format_elapsed(elapsed_ms);
        self.line(&format!("Time: {secs}s,{millis}ms: Detected key: {key}"))
    }

    /// Notice for a non-alphanumeric press before the session has started.
    pub fn only_letters_or_numbers(&mut self) -> io::Result<()> {
        self.line("Please only use letters or numbers.")
    }

    /// Notice for a rejected press during recording.
    pub fn press_ignored(&mut self) -> io::Result<()> {
        self.line("Only letters or numbers will be counted. Key press was ignored.")
    }

    pub fn manual_exit(&mut self, elapsed_ms: u64) -> io::Result<()> {
        let (secs, millis) = format_elapsed(elapsed_ms);
        self.line(&format!("Time: {secs}s,{millis}ms: End of recording - manual exit"))
    }

    /// Timeout notice; the bell and reverse-video flash fire only on this
    /// path, never on manual stop.
    pub fn timeout(&mut self, elapsed_secs: u64) -> io::Result<()> {
        if self.settings.bell_on_timeout {
            queue!(self.out, Print(BELL))?;
        }
        if self.settings.flash_on_timeout {
            queue!(
                self.out,
                SetAttribute(Attribute::Reverse),
                Print(" TIME OUT "),
                SetAttribute(Attribute::Reset),
                Print("\r\n")
            )?;
        }
        self.line(&format!(
            "End of recording - time out after {elapsed_secs} seconds"
        ))
    }
}
