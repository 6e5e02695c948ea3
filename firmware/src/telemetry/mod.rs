//! Journal mirroring and logging helpers.
//!
//! The face keeps its own bounded journal; this module copies entries that
//! have not been seen yet out to defmt on the target and to stdout on the host,
//! along with the frame drawn after each tick and a few lifecycle lines.

use core::fmt;

use tally_core::journal::{Journal, JournalEntry};
use tally_core::render::Frame;

/// Forwards new journal entries to the log, remembering how far it got.
#[derive(Debug, Default)]
pub struct JournalMirror {
    mark: u32,
}

impl JournalMirror {
    #[must_use]
    pub const fn new() -> Self {
        Self { mark: 0 }
    }

    /// Logs every entry recorded since the previous call and returns how many there were.
    pub fn mirror<const N: usize>(&mut self, journal: &Journal<N>) -> usize {
        let mut count = 0;
        for entry in journal.since(self.mark) {
            log_entry(entry);
            count += 1;
        }
        self.mark = journal.next_seq();
        count
    }

    /// Sequence number the next mirrored entry will carry.
    #[must_use]
    pub const fn mark(&self) -> u32 {
        self.mark
    }
}

fn log_entry(entry: &JournalEntry) {
    emit_log("journal", entry.at_ms, &entry.event);
}

/// Logs the frame produced for a tick.
pub fn log_frame(at_ms: u32, frame: &Frame) {
    emit_log("display", at_ms, frame);
}

/// Ticks between heartbeat lines.
pub const HEARTBEAT_TICKS: u32 = 60;

struct Heartbeat {
    ticks: u32,
    dropped_edges: u32,
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} dropped_edges={}",
            self.ticks, self.dropped_edges
        )
    }
}

/// Logs tick and dropped-edge counters once every [`HEARTBEAT_TICKS`] ticks.
///
/// Returns whether a line was written.
pub fn log_heartbeat(at_ms: u32, ticks: u32, dropped_edges: u32) -> bool {
    if ticks == 0 || !ticks.is_multiple_of(HEARTBEAT_TICKS) {
        return false;
    }
    emit_log(
        "status",
        at_ms,
        &Heartbeat {
            ticks,
            dropped_edges,
        },
    );
    true
}

/// Logs a lifecycle transition such as setup or focus changes.
pub fn log_lifecycle(at_ms: u32, what: &'static str) {
    emit_log("face", at_ms, &what);
}

#[cfg(target_os = "none")]
fn emit_log(topic: &'static str, at_ms: u32, detail: &dyn fmt::Display) {
    defmt::info!(
        "{} t={}ms {}",
        topic,
        at_ms,
        defmt::Display2Format(detail)
    );
}

#[cfg(not(target_os = "none"))]
fn emit_log(topic: &'static str, at_ms: u32, detail: &dyn fmt::Display) {
    println!("{topic} t={at_ms}ms {detail}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::config::Counter;
    use tally_core::tracker::TrackerEvent;

    #[test]
    fn mirror_only_forwards_new_entries() {
        let mut journal: Journal = Journal::new();
        let mut mirror = JournalMirror::new();
        assert_eq!(mirror.mirror(&journal), 0);

        journal.record(
            1_000,
            TrackerEvent::TallyIncremented {
                counter: Counter::A,
                value: 1,
            },
        );
        journal.record(1_000, TrackerEvent::ReleaseRequested);
        assert_eq!(mirror.mirror(&journal), 2);
        assert_eq!(mirror.mark(), 2);

        assert_eq!(mirror.mirror(&journal), 0);
        journal.record(2_000, TrackerEvent::TallyReset { counter: Counter::A });
        assert_eq!(mirror.mirror(&journal), 1);
    }

    #[test]
    fn heartbeat_logs_once_per_interval() {
        assert!(!log_heartbeat(0, 0, 0));
        assert!(!log_heartbeat(1_000, 1, 0));
        assert!(!log_heartbeat(59_000, HEARTBEAT_TICKS - 1, 0));
        assert!(log_heartbeat(60_000, HEARTBEAT_TICKS, 2));
        assert!(log_heartbeat(120_000, HEARTBEAT_TICKS * 2, 2));
    }

    #[test]
    fn heartbeat_line_names_both_counters() {
        let line = format!(
            "{}",
            Heartbeat {
                ticks: 120,
                dropped_edges: 3
            }
        );
        assert_eq!(line, "ticks=120 dropped_edges=3");
    }
}
