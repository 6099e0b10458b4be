//! Capture loop
//!
//! Single-threaded cooperative loop: poll the input source once per tick,
//! feed decoded characters to the state machine, render each transition.
//! Cancellation comes in-band (stop key, timeout) or via the interrupt flag
//! the signal handler sets.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};

use crate::capture::{
    CaptureSession, InputSource, MonotonicClock, Polled, Step, StopReason,
};
use crate::feedback::Feedback;

/// Drive the session until it terminates. A failed poll is fatal; an empty
/// poll is just "no event this tick".
pub fn run_capture<I, W>(
    input: &mut I,
    session: &mut CaptureSession,
    clock: &MonotonicClock,
    feedback: &mut Feedback<W>,
    poll_interval: Duration,
    interrupted: &AtomicBool,
) -> anyhow::Result<()>
where
    I: InputSource,
    W: Write,
{
    while !session.is_terminated() {
        if interrupted.load(Ordering::Relaxed) {
            if let Step::Stopped { elapsed_ms, .. } = session.interrupt(clock.now_ms()) {
                feedback.manual_exit(elapsed_ms)?;
            }
            break;
        }

        let key = match input.poll(poll_interval)? {
            Polled::Idle | Polled::Undecodable => continue,
            Polled::Key(key) => key,
        };

        match session.offer_key(key, clock.now_ms()) {
            Step::Ignored => feedback.only_letters_or_numbers()?,
            Step::Started { key } => {
                debug!("recording started, initial condition {key:?}");
                feedback.started(key)?;
            }
            Step::Rejected { key } => {
                warn!("rejected non-alphanumeric key {key:?}");
                feedback.press_ignored()?;
            }
            Step::Logged { key, elapsed_ms } => {
                debug!("key {key:?} at {elapsed_ms} ms");
                feedback.key_logged(key, elapsed_ms)?;
            }
            Step::Stopped { reason, elapsed_ms } => match reason {
                StopReason::Manual => feedback.manual_exit(elapsed_ms)?,
                StopReason::Timeout { elapsed_secs } => feedback.timeout(elapsed_secs)?,
            },
        }
    }
    Ok(())
}
