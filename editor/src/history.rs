//! Bounded undo/redo log over [`EditCommand`]s.

use std::collections::VecDeque;

use crate::command::{EditCommand, EditContext};
use crate::error::{EditError, EditResult};

pub const DEFAULT_MAX_UNDO: usize = 100;

#[derive(Debug)]
struct Entry {
    command: EditCommand,
    applied: bool,
}

/// Two-stack command history.
///
/// `add` applies the command first; a command that fails to apply never
/// enters the log. Undo moves the newest undo entry to the redo stack,
/// redo moves it back. Any new command clears the redo stack. The undo
/// side is bounded; the oldest entry is dropped on overflow.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<Entry>,
    redo: Vec<Entry>,
    max_undo: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl History {
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_undo,
        }
    }

    /// Applies the command and records it. On failure the scene is
    /// unchanged and the history keeps its previous state.
    pub fn add(&mut self, mut command: EditCommand, ctx: &mut EditContext<'_>) -> EditResult {
        command.apply(ctx)?;
        self.redo.clear();
        self.undo.push_back(Entry {
            command,
            applied: true,
        });
        while self.undo.len() > self.max_undo {
            self.undo.pop_front();
        }
        Ok(())
    }

    /// Reverts the newest applied command. `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, ctx: &mut EditContext<'_>) -> EditResult<bool> {
        let Some(mut entry) = self.undo.pop_back() else {
            return Ok(false);
        };
        if !entry.applied {
            self.undo.push_back(entry);
            return Err(EditError::InvalidState(
                "undo entry was never applied".into(),
            ));
        }
        match entry.command.revert(ctx) {
            Ok(()) => {
                entry.applied = false;
                self.redo.push(entry);
                Ok(true)
            }
            Err(err) => {
                self.undo.push_back(entry);
                Err(err)
            }
        }
    }

    /// Re-applies the newest undone command. `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, ctx: &mut EditContext<'_>) -> EditResult<bool> {
        let Some(mut entry) = self.redo.pop() else {
            return Ok(false);
        };
        if entry.applied {
            self.redo.push(entry);
            return Err(EditError::InvalidState("redo entry already applied".into()));
        }
        match entry.command.apply(ctx) {
            Ok(()) => {
                entry.applied = true;
                self.undo.push_back(entry);
                Ok(true)
            }
            Err(err) => {
                self.redo.push(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undoable command labels, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo.iter().rev().map(|e| e.command.description())
    }

    /// Redoable command labels, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo.iter().rev().map(|e| e.command.description())
    }

    /// The newest undoable command, if any.
    pub fn last_command(&self) -> Option<&EditCommand> {
        self.undo.back().map(|e| &e.command)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
