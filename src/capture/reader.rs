//! Raw input reader
//!
//! Thin contract over the terminal: one poll per tick, with "no event",
//! "event that is not a character" and "decoded character" as three explicit
//! outcomes instead of a catch-all.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

/// Outcome of one input poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    /// Nothing arrived within the poll interval.
    Idle,
    /// An event arrived but carries no character (function key, arrow, ...).
    /// Treated as "no event this tick" and never surfaced to the user.
    Undecodable,
    /// A decoded character press.
    Key(char),
}

/// Source of key presses for the capture loop.
pub trait InputSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Polled>;
}

/// Production input source backed by crossterm.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<Polled> {
        if !event::poll(timeout)? {
            return Ok(Polled::Idle);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char(c) => Ok(Polled::Key(c)),
                _ => Ok(Polled::Undecodable),
            },
            // key releases, resizes and the like are not presses
            _ => Ok(Polled::Idle),
        }
    }
}

/// Scripted input source for tests: yields queued outcomes, then `Idle`.
pub struct ScriptedInput {
    queue: std::collections::VecDeque<Polled>,
}

impl ScriptedInput {
    pub fn new(outcomes: impl IntoIterator<Item = Polled>) -> Self {
        Self { queue: outcomes.into_iter().collect() }
    }

    pub fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _timeout: Duration) -> io::Result<Polled> {
        Ok(self.queue.pop_front().unwrap_or(Polled::Idle))
    }
}
