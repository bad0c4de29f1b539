use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::instance::{LiveComponentInstance, Point};

/// Default bound on the number of retained history entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Before/after payload of one history entry, keyed by the action kind so
/// undo/redo can be matched exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryChange {
    Insert {
        instance: LiveComponentInstance,
    },
    Remove {
        instance: LiveComponentInstance,
    },
    Modify {
        before: LiveComponentInstance,
        after: LiveComponentInstance,
    },
    Move {
        #[serde(skip_serializing_if = "Option::is_none")]
        before: Option<Point>,
        after: Point,
    },
}

impl HistoryChange {
    pub fn kind(&self) -> &'static str {
        match self {
            HistoryChange::Insert { .. } => "insert",
            HistoryChange::Remove { .. } => "remove",
            HistoryChange::Modify { .. } => "modify",
            HistoryChange::Move { .. } => "move",
        }
    }
}

/// One undo/redo-able record of a single engine action. Immutable once
/// appended; undo/redo only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionHistoryEntry {
    pub entry_id: String,
    pub recorded_at: DateTime<Utc>,
    pub component_id: String,
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    pub change: HistoryChange,
}

impl InsertionHistoryEntry {
    pub fn new(component_id: &str, instance_id: &str, change: HistoryChange) -> Self {
        let position = match &change {
            HistoryChange::Insert { instance } | HistoryChange::Remove { instance } => {
                instance.position
            }
            HistoryChange::Modify { after, .. } => after.position,
            HistoryChange::Move { after, .. } => Some(*after),
        };
        InsertionHistoryEntry {
            entry_id: Uuid::new_v4().to_string(),
            recorded_at: Utc::now(),
            component_id: component_id.to_string(),
            instance_id: instance_id.to_string(),
            position,
            change,
        }
    }
}

/// A single linear undo stack. `cursor` points at the last applied entry,
/// or -1 when everything has been undone; it always satisfies
/// `-1 <= cursor < len`.
#[derive(Debug, Clone)]
pub struct InsertionHistory {
    entries: Vec<InsertionHistoryEntry>,
    cursor: isize,
    capacity: usize,
}

impl Default for InsertionHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl InsertionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        InsertionHistory {
            entries: Vec::new(),
            cursor: -1,
            capacity: capacity.max(1),
        }
    }

    /// Append an entry. Any entries past the cursor are discarded first
    /// (branching history is not supported); overflowing the capacity
    /// evicts the oldest entries and clamps the cursor.
    pub fn push(&mut self, entry: InsertionHistoryEntry) {
        self.entries.truncate((self.cursor + 1) as usize);
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() as isize - 1;
    }

    /// Step back one entry, returning the entry to revert. Pure pointer
    /// movement: translating it into concrete calls is the caller's job.
    pub fn undo(&mut self) -> Option<InsertionHistoryEntry> {
        if self.cursor < 0 {
            return None;
        }
        let entry = self.entries[self.cursor as usize].clone();
        self.cursor -= 1;
        Some(entry)
    }

    /// Step forward one entry, returning the entry to re-apply.
    pub fn redo(&mut self) -> Option<InsertionHistoryEntry> {
        if self.cursor + 1 >= self.entries.len() as isize {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor as usize].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len() as isize
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn entries(&self) -> &[InsertionHistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> InsertionHistoryEntry {
        let instance = LiveComponentInstance::new("button");
        InsertionHistoryEntry::new(
            "button",
            &format!("button-{}", n),
            HistoryChange::Insert { instance },
        )
    }

    #[test]
    fn test_undo_redo_walks_the_stack() {
        let mut history = InsertionHistory::default();
        history.push(entry(1));
        history.push(entry(2));

        let undone = history.undo().unwrap();
        assert_eq!(undone.instance_id, "button-2");
        assert_eq!(history.cursor(), 0);

        let redone = history.redo().unwrap();
        assert_eq!(redone.instance_id, "button-2");
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_at_bottom_is_none() {
        let mut history = InsertionHistory::default();
        assert!(history.undo().is_none());
        history.push(entry(1));
        history.undo();
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), -1);
    }

    #[test]
    fn test_new_action_discards_redo_tail() {
        let mut history = InsertionHistory::default();
        history.push(entry(1));
        history.push(entry(2));
        history.undo();
        history.push(entry(3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[1].instance_id, "button-3");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest_and_clamps() {
        let mut history = InsertionHistory::with_capacity(3);
        for n in 0..7 {
            history.push(entry(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.entries()[0].instance_id, "button-4");
    }
}
