//! Key-event capture: clock, input contract, state machine and accumulator

pub mod accumulator;
pub mod clock;
pub mod machine;
pub mod reader;

pub use accumulator::IntervalAccumulator;
pub use clock::MonotonicClock;
pub use machine::{CaptureSession, EventLog, LogEntry, Phase, Step, StopReason};
pub use reader::{InputSource, Polled, ScriptedInput, TerminalInput};
