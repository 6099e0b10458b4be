//! ethocount - terminal key-press timestamping for behavioral observation
//!
//! Listens for single key presses, records elapsed milliseconds since the
//! first accepted press, and writes a raw event log plus a per-key duration
//! summary as CSV.

pub mod capture;
pub mod config;
pub mod feedback;
pub mod output;
pub mod runtime;
pub mod session;

pub use config::Settings;
pub use session::SessionConfig;
