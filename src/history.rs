//! Bounded, numbered ledger of executed command lines.

use std::collections::VecDeque;
use std::io::{self, Write};

/// Number of commands retained when no depth is configured.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Identifier assigned to each recorded command, starting at 1.
pub type SequenceNumber = u64;

/// A single recorded command line, exactly as the user typed it (or as it was replayed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sequence_number: SequenceNumber,
    pub text: String,
}

/// Sliding window over the most recently executed commands.
///
/// Holds at most `depth` entries, oldest first. Once full, every insertion evicts the
/// oldest entry. Sequence numbers keep counting across evictions and are never reused.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    depth: usize,
    next_sequence_number: SequenceNumber,
}

impl HistoryStore {
    /// Create an empty store retaining up to `depth` commands.
    ///
    /// A depth of zero is treated as one; the store always remembers at least the last command.
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            entries: VecDeque::with_capacity(depth),
            depth,
            next_sequence_number: 1,
        }
    }

    /// Record `command` under the next sequence number, evicting the oldest entry when full.
    pub fn add(&mut self, command: impl Into<String>) {
        if self.entries.len() == self.depth {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            sequence_number: self.next_sequence_number,
            text: command.into(),
        });
        self.next_sequence_number += 1;
    }

    /// Write one `<seq>\t<text>` line per entry, oldest first. Writes nothing when empty.
    pub fn display(&self, out: &mut dyn Write) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{}\t{}", entry.sequence_number, entry.text)?;
        }
        Ok(())
    }

    /// Text of the retained command numbered `sequence_number`, if it is still in the window.
    pub fn lookup(&self, sequence_number: SequenceNumber) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.sequence_number == sequence_number)
            .map(|entry| entry.text.as_str())
    }

    /// Sequence number of the newest entry, or 0 when nothing has been recorded.
    pub fn last_sequence_number(&self) -> SequenceNumber {
        self.entries
            .back()
            .map_or(0, |entry| entry.sequence_number)
    }

    pub fn next_sequence_number(&self) -> SequenceNumber {
        self.next_sequence_number
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displayed(store: &HistoryStore) -> String {
        let mut out = Vec::new();
        store.display(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = HistoryStore::default();
        assert!(store.is_empty());
        assert_eq!(store.last_sequence_number(), 0);
        assert_eq!(store.lookup(1), None);
        assert_eq!(displayed(&store), "");
    }

    #[test]
    fn test_retains_most_recent_up_to_depth() {
        for n in 0..25 {
            let mut store = HistoryStore::new(10);
            for i in 1..=n {
                store.add(format!("cmd{i}"));
            }
            assert_eq!(store.len(), n.min(10));
            let texts: Vec<_> = store.iter().map(|e| e.text.clone()).collect();
            let expected: Vec<_> = (n.saturating_sub(10) + 1..=n)
                .map(|i| format!("cmd{i}"))
                .collect();
            assert_eq!(texts, expected);
        }
    }

    #[test]
    fn test_sequence_numbers_survive_eviction() {
        let mut store = HistoryStore::new(3);
        for i in 1..=7 {
            store.add(format!("cmd{i}"));
        }
        let numbers: Vec<_> = store.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![5, 6, 7]);
        assert_eq!(store.next_sequence_number(), 8);
        assert_eq!(store.last_sequence_number(), 7);
    }

    #[test]
    fn test_display_after_eviction() {
        let mut store = HistoryStore::default();
        for i in 1..=12 {
            store.add(format!("cmd{i}"));
        }
        let expected: String = (3..=12).map(|i| format!("{i}\tcmd{i}\n")).collect();
        assert_eq!(displayed(&store), expected);
    }

    #[test]
    fn test_lookup() {
        let mut store = HistoryStore::new(2);
        store.add("ls");
        store.add("pwd");
        store.add("echo hi");
        assert_eq!(store.lookup(1), None);
        assert_eq!(store.lookup(2), Some("pwd"));
        assert_eq!(store.lookup(3), Some("echo hi"));
        assert_eq!(store.lookup(4), None);
    }

    #[test]
    fn test_zero_depth_keeps_one() {
        let mut store = HistoryStore::new(0);
        store.add("a");
        store.add("b");
        assert_eq!(store.depth(), 1);
        assert_eq!(displayed(&store), "2\tb\n");
    }
}
