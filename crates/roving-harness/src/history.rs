#![forbid(unsafe_code)]

//! Snapshot-based undo/redo middleware.
//!
//! The dispatcher hands the history the state as it was before each command
//! together with the command itself. Commands of one dispatch share a cause
//! and collapse into a single undo step, so undoing a press that focused,
//! selected and expanded restores all three at once.

use std::collections::VecDeque;

use roving_core::Command;

use crate::dispatcher::Snapshot;
use crate::guard::CauseId;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
struct Entry {
    cause: CauseId,
    command: &'static str,
    prior: Snapshot,
}

#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    undo: VecDeque<Entry>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SnapshotHistory {
    /// History keeping at most `limit` undo steps (at least one).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Commands that change application data. Focus moves, zone traversal
    /// and the history commands themselves are not recorded.
    #[must_use]
    pub fn records(command: &Command) -> bool {
        !command.is_navigation() && !matches!(command, Command::Undo | Command::Redo)
    }

    /// True when `command` would open a new undo step, i.e. the caller
    /// should capture a prior snapshot.
    #[must_use]
    pub fn wants(&self, command: &Command, cause: CauseId) -> bool {
        Self::records(command) && self.undo.back().is_none_or(|entry| entry.cause != cause)
    }

    /// Record `prior` as the state before `command`.
    pub fn record(&mut self, prior: Snapshot, command: &Command, cause: CauseId) {
        if !self.wants(command, cause) {
            return;
        }
        self.undo.push_back(Entry {
            cause,
            command: command.name(),
            prior,
        });
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back. Returns the snapshot to restore.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let entry = self.undo.pop_back()?;
        tracing::debug!(command = entry.command, "undo");
        self.redo.push(current);
        Some(entry.prior)
    }

    /// Step forward again. Returns the snapshot to restore.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        // Cause 0 is never issued by the guard.
        self.undo.push_back(Entry {
            cause: CauseId(0),
            command: "redo",
            prior: current,
        });
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo steps available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Command names of the undo steps, oldest first.
    pub fn steps(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.undo.iter().map(|entry| entry.command)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
