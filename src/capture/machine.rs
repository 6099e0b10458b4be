//! Recording state machine
//!
//! Owns the AwaitingStart/Recording/Terminated lifecycle, the start-time
//! anchor, per-press elapsed-time computation and the stop conditions. The
//! machine is pure: it consumes `(key, monotonic ms reading)` pairs and
//! returns explicit transitions, so every timing property is testable without
//! a terminal.

use std::collections::BTreeMap;
use std::fmt;

use super::accumulator::{IntervalAccumulator, PRE_START};

/// Value stored in the event log for one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A recorded condition key.
    Key(char),
    /// Stop key pressed.
    ManualExit,
    /// Observation time exceeded; seconds are the actual elapsed seconds at
    /// the press that tripped the boundary.
    Timeout { elapsed_secs: u64 },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Key(c) => write!(f, "{c}"),
            LogEntry::ManualExit => write!(f, "End of recording - manual exit"),
            LogEntry::Timeout { elapsed_secs } => {
                write!(f, "End of recording - time out after {elapsed_secs} seconds")
            }
        }
    }
}

/// Raw event log: elapsed ms → entry, ordered ascending.
///
/// Two presses resolving to the identical millisecond overwrite one another;
/// timestamps are unique by construction of the map.
pub type EventLog = BTreeMap<u64, LogEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingStart,
    Recording,
    Terminated,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    Timeout { elapsed_secs: u64 },
}

/// Outcome of offering one input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No state change (non-alphanumeric before start, or input after
    /// termination).
    Ignored,
    /// First accepted key; recording begins, this key is the active condition.
    Started { key: char },
    /// Non-alphanumeric press during recording; previous condition preserved.
    Rejected { key: char },
    /// Valid press recorded as an event row.
    Logged { key: char, elapsed_ms: u64 },
    /// Session terminated.
    Stopped { reason: StopReason, elapsed_ms: u64 },
}

/// True for keys accepted as condition labels.
pub fn is_condition_key(key: char) -> bool {
    key.is_ascii_alphanumeric()
}

/// One observation session: state machine plus the event log and interval
/// accumulator it owns. Constructed once, consumed once.
#[derive(Debug)]
pub struct CaptureSession {
    phase: Phase,
    stop_key: char,
    /// Observation bound in seconds; `None` runs until the stop key.
    limit_secs: Option<u64>,
    /// Clock reading at the first accepted press.
    start_ms: u64,
    previous_elapsed: u64,
    previous_key: char,
    log: EventLog,
    accumulator: IntervalAccumulator,
}

impl CaptureSession {
    pub fn new(limit_secs: Option<u64>, stop_key: char) -> Self {
        Self {
            phase: Phase::AwaitingStart,
            stop_key,
            limit_secs,
            start_ms: 0,
            previous_elapsed: 0,
            previous_key: PRE_START,
            log: EventLog::new(),
            accumulator: IntervalAccumulator::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Offer a decoded key press observed at monotonic clock reading `at_ms`.
    pub fn offer_key(&mut self, key: char, at_ms: u64) -> Step {
        match self.phase {
            Phase::AwaitingStart => self.start(key, at_ms),
            Phase::Recording => self.record(key, at_ms),
            Phase::Terminated => Step::Ignored,
        }
    }

    fn start(&mut self, key: char, at_ms: u64) -> Step {
        if !is_condition_key(key) {
            return Step::Ignored;
        }
        // The initial key anchors time zero and becomes the active condition;
        // it gets no event row of its own.
        self.start_ms = at_ms;
        self.previous_elapsed = 0;
        self.previous_key = key;
        self.phase = Phase::Recording;
        Step::Started { key }
    }

    fn record(&mut self, key: char, at_ms: u64) -> Step {
        if !is_condition_key(key) {
            // Must not corrupt the active condition or introduce a
            // zero-length interval attributed to garbage input.
            return Step::Rejected { key };
        }

        let elapsed_ms = at_ms.saturating_sub(self.start_ms);
        let delta = elapsed_ms as i64 - self.previous_elapsed as i64;
        self.accumulator.record(self.previous_key, delta);

        if key == self.stop_key {
            return self.stop(StopReason::Manual, elapsed_ms);
        }

        if let Some(limit) = self.limit_secs {
            let elapsed_secs = elapsed_ms / 1000;
            if elapsed_secs >= limit {
                // Cancel the overshoot so the active key's sum stops exactly
                // at the observation boundary.
                let overshoot = elapsed_ms as i64 - (limit * 1000) as i64;
                self.accumulator.record(self.previous_key, -overshoot);
                return self.stop(StopReason::Timeout { elapsed_secs }, elapsed_ms);
            }
        }

        self.log.insert(elapsed_ms, LogEntry::Key(key));
        self.previous_elapsed = elapsed_ms;
        self.previous_key = key;
        Step::Logged { key, elapsed_ms }
    }

    fn stop(&mut self, reason: StopReason, elapsed_ms: u64) -> Step {
        let entry = match reason {
            StopReason::Manual => LogEntry::ManualExit,
            StopReason::Timeout { elapsed_secs } => LogEntry::Timeout { elapsed_secs },
        };
        self.log.insert(elapsed_ms, entry);
        self.phase = Phase::Terminated;
        Step::Stopped { reason, elapsed_ms }
    }

    /// Graceful-shutdown entry for the signal path. While recording this is
    /// the manual-stop finalize sequence; before the first key it just
    /// terminates with nothing recorded.
    pub fn interrupt(&mut self, at_ms: u64) -> Step {
        match self.phase {
            Phase::Recording => {
                let elapsed_ms = at_ms.saturating_sub(self.start_ms);
                let delta = elapsed_ms as i64 - self.previous_elapsed as i64;
                self.accumulator.record(self.previous_key, delta);
                self.stop(StopReason::Manual, elapsed_ms)
            }
            _ => {
                self.phase = Phase::Terminated;
                Step::Ignored
            }
        }
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Hand the session off to the output writer: the raw log and the summed
    /// per-key totals.
    pub fn into_outputs(self) -> (EventLog, BTreeMap<char, i64>) {
        let summary = self.accumulator.finalize();
        (self.log, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(limit_secs: Option<u64>) -> CaptureSession {
        CaptureSession::new(limit_secs, 'P')
    }

    #[test]
    fn waits_for_alphanumeric_start() {
        let mut s = session(None);
        assert_eq!(s.offer_key('!', 100), Step::Ignored);
        assert_eq!(s.phase(), Phase::AwaitingStart);

        assert_eq!(s.offer_key('a', 500), Step::Started { key: 'a' });
        assert_eq!(s.phase(), Phase::Recording);
        // the initial key gets no event row
        assert!(s.event_log().is_empty());
    }

    #[test]
    fn manual_stop_scenario() {
        // a@0, b@1500, P@4000 → log {1500: b, 4000: manual exit},
        // summary {a: 1500, b: 2500}
        let mut s = session(None);
        s.offer_key('a', 0);
        assert_eq!(
            s.offer_key('b', 1500),
            Step::Logged { key: 'b', elapsed_ms: 1500 }
        );
        assert_eq!(
            s.offer_key('P', 4000),
            Step::Stopped { reason: StopReason::Manual, elapsed_ms: 4000 }
        );

        let (log, summary) = s.into_outputs();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&1500), Some(&LogEntry::Key('b')));
        assert_eq!(log.get(&4000), Some(&LogEntry::ManualExit));
        assert_eq!(summary.get(&'a'), Some(&1500));
        assert_eq!(summary.get(&'b'), Some(&2500));
        // the stop key never appears as a condition
        assert!(!summary.contains_key(&'P'));
    }

    #[test]
    fn timeout_truncates_final_interval() {
        // observation 3s, press at 4000ms: b's interval 2500 → 1500
        let mut s = session(Some(3));
        s.offer_key('a', 0);
        s.offer_key('b', 1500);
        let step = s.offer_key('c', 4000);
        assert_eq!(
            step,
            Step::Stopped { reason: StopReason::Timeout { elapsed_secs: 4 }, elapsed_ms: 4000 }
        );

        let (log, summary) = s.into_outputs();
        assert_eq!(log.get(&4000), Some(&LogEntry::Timeout { elapsed_secs: 4 }));
        assert_eq!(summary.get(&'a'), Some(&1500));
        assert_eq!(summary.get(&'b'), Some(&1500));
        assert!(!summary.contains_key(&'c'));
    }

    #[test]
    fn timeout_sum_equals_configured_duration() {
        let mut s = session(Some(3));
        s.offer_key('a', 0);
        s.offer_key('b', 700);
        s.offer_key('b', 2100);
        s.offer_key('x', 3456);

        let (_, summary) = s.into_outputs();
        let total: i64 = summary.values().sum();
        assert_eq!(total, 3000);
    }

    #[test]
    fn timeout_message_uses_actual_elapsed_seconds() {
        let mut s = session(Some(3));
        s.offer_key('a', 0);
        let step = s.offer_key('b', 5999);
        assert_eq!(
            step,
            Step::Stopped { reason: StopReason::Timeout { elapsed_secs: 5 }, elapsed_ms: 5999 }
        );
        assert_eq!(
            s.event_log().get(&5999).unwrap().to_string(),
            "End of recording - time out after 5 seconds"
        );
    }

    #[test]
    fn stop_key_wins_over_timeout() {
        // P past the boundary still records the manual-exit marker
        let mut s = session(Some(3));
        s.offer_key('a', 0);
        let step = s.offer_key('P', 4000);
        assert_eq!(
            step,
            Step::Stopped { reason: StopReason::Manual, elapsed_ms: 4000 }
        );
    }

    #[test]
    fn stop_key_is_case_sensitive() {
        let mut s = session(None);
        s.offer_key('a', 0);
        // lowercase p is an ordinary condition key
        assert_eq!(s.offer_key('p', 1000), Step::Logged { key: 'p', elapsed_ms: 1000 });
        assert_eq!(s.phase(), Phase::Recording);
    }

    #[test]
    fn invalid_key_preserves_active_condition() {
        let mut s = session(None);
        s.offer_key('a', 0);
        s.offer_key('b', 1000);

        assert_eq!(s.offer_key('%', 1600), Step::Rejected { key: '%' });
        assert_eq!(s.event_log().len(), 1);

        s.offer_key('c', 2000);
        s.offer_key('P', 2600);

        let (log, summary) = s.into_outputs();
        // no extra row, no interval attributed to the rejected key
        assert!(!log.values().any(|e| *e == LogEntry::Key('%')));
        assert!(!summary.contains_key(&'%'));
        // b's interval runs 1000→2000 despite the rejected press in between
        assert_eq!(summary.get(&'b'), Some(&1000));
    }

    #[test]
    fn identical_millisecond_presses_overwrite() {
        let mut s = session(None);
        s.offer_key('a', 0);
        s.offer_key('b', 500);
        s.offer_key('c', 500);
        assert_eq!(s.event_log().get(&500), Some(&LogEntry::Key('c')));
        assert_eq!(s.event_log().len(), 1);
    }

    #[test]
    fn terminated_session_ignores_further_input() {
        let mut s = session(None);
        s.offer_key('a', 0);
        s.offer_key('P', 100);
        assert_eq!(s.offer_key('z', 200), Step::Ignored);
        assert_eq!(s.offer_key('P', 300), Step::Ignored);
        assert_eq!(s.event_log().len(), 1);
    }

    #[test]
    fn rapid_repeated_input_does_not_corrupt_state() {
        let mut s = session(None);
        s.offer_key('a', 0);
        for i in 0..500u64 {
            s.offer_key('b', i * 2);
        }
        s.offer_key('P', 1200);
        let (_, summary) = s.into_outputs();
        let total: i64 = summary.values().sum();
        assert_eq!(total, 1200);
    }

    #[test]
    fn interrupt_during_recording_finalizes_like_manual_stop() {
        let mut s = session(None);
        s.offer_key('a', 0);
        s.offer_key('b', 1500);
        let step = s.interrupt(4000);
        assert_eq!(
            step,
            Step::Stopped { reason: StopReason::Manual, elapsed_ms: 4000 }
        );

        let (log, summary) = s.into_outputs();
        assert_eq!(log.get(&4000), Some(&LogEntry::ManualExit));
        assert_eq!(summary.get(&'b'), Some(&2500));
    }

    #[test]
    fn interrupt_before_start_records_nothing() {
        let mut s = session(None);
        assert_eq!(s.interrupt(100), Step::Ignored);
        assert!(s.is_terminated());
        let (log, summary) = s.into_outputs();
        assert!(log.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn condition_key_filter() {
        for key in ['a', 'Z', '0', '9'] {
            assert!(is_condition_key(key));
        }
        for key in [' ', '%', 'ä', '\n', '\u{1b}'] {
            assert!(!is_condition_key(key));
        }
    }
}
