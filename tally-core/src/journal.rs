//! Fixed-size history of tracker events.
//!
//! The core crate does not log. Instead every [`TrackerEvent`] the face
//! produces is stamped with the session clock and written into a ring buffer
//! that hosts drain into their own logger (defmt on the watch, stdout and the
//! transcript file in the emulator).

use heapless::{HistoryBuf, OldestOrdered};

use crate::tracker::TrackerEvent;

/// Number of entries retained before the oldest is overwritten.
pub const JOURNAL_CAPACITY: usize = 32;

/// One journaled event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct JournalEntry {
    /// Sequence number, wrapping.
    pub seq: u32,
    /// Session clock when the event happened.
    pub at_ms: u32,
    pub event: TrackerEvent,
}

/// Ring buffer of journaled events.
#[derive(Clone, Debug)]
pub struct Journal<const CAPACITY: usize = JOURNAL_CAPACITY> {
    ring: HistoryBuf<JournalEntry, CAPACITY>,
    next_seq: u32,
}

impl<const CAPACITY: usize> Journal<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_seq: 0,
        }
    }

    /// Appends an event and returns its sequence number.
    pub fn record(&mut self, at_ms: u32, event: TrackerEvent) -> u32 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.ring.write(JournalEntry { seq, at_ms, event });
        seq
    }

    /// Entries in the order they were recorded.
    pub fn oldest_first(&self) -> OldestOrdered<'_, JournalEntry> {
        self.ring.oldest_ordered()
    }

    /// Entries recorded at or after sequence number `seq`.
    ///
    /// Hosts remember the next sequence number they expect and call this to
    /// drain only what is new.
    pub fn since(&self, seq: u32) -> impl Iterator<Item = &JournalEntry> {
        self.ring
            .oldest_ordered()
            .filter(move |entry| entry.seq.wrapping_sub(seq) < u32::MAX / 2)
    }

    /// Sequence number the next recorded entry will receive.
    #[must_use]
    pub const fn next_seq(&self) -> u32 {
        self.next_seq
    }

    #[must_use]
    pub fn latest(&self) -> Option<&JournalEntry> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<const CAPACITY: usize> Default for Journal<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Counter;

    #[test]
    fn keeps_most_recent_entries_in_order() {
        let mut journal = Journal::<4>::new();
        for value in 1..=6 {
            journal.record(
                u32::from(value) * 1_000,
                TrackerEvent::TallyIncremented {
                    counter: Counter::A,
                    value,
                },
            );
        }

        assert_eq!(journal.len(), 4);
        let times: heapless::Vec<u32, 4> = journal.oldest_first().map(|e| e.at_ms).collect();
        assert_eq!(times.as_slice(), &[3_000, 4_000, 5_000, 6_000]);
        assert_eq!(journal.latest().map(|e| e.seq), Some(5));
    }

    #[test]
    fn since_skips_entries_already_drained() {
        let mut journal = Journal::<8>::new();
        journal.record(1_000, TrackerEvent::ReleaseRequested);
        let mark = journal.next_seq();
        journal.record(2_000, TrackerEvent::TallyReset { counter: Counter::B });

        let fresh: heapless::Vec<u32, 8> = journal.since(mark).map(|e| e.at_ms).collect();
        assert_eq!(fresh.as_slice(), &[2_000]);
        assert_eq!(journal.since(journal.next_seq()).count(), 0);
    }
}
