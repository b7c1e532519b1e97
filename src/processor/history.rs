//! Undo/redo over whole step lists.
//!
//! Every snapshot is the full list serialized to JSON. Step lists are a few
//! hundred entries at most, so no diffing.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::debug;

use crate::model::Step;

/// Snapshots kept on each stack.
pub const MAX_DEPTH: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("could not snapshot steps: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not restore snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// An immutable serialized copy of a step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Box<str>);

impl Snapshot {
    pub fn take(steps: &[Step]) -> Result<Self, HistoryError> {
        let json = serde_json::to_string(steps).map_err(HistoryError::Encode)?;
        Ok(Self(json.into_boxed_str()))
    }

    pub fn restore(&self) -> Result<Vec<Step>, HistoryError> {
        serde_json::from_str(&self.0).map_err(HistoryError::Decode)
    }
}

#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snap: Snapshot) {
    if stack.len() == MAX_DEPTH {
        stack.pop_front();
    }
    stack.push_back(snap);
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call before every mutation, with the list as it is before the change.
    pub fn save_state(&mut self, steps: &[Step]) -> Result<(), HistoryError> {
        push_bounded(&mut self.undo, Snapshot::take(steps)?);
        self.redo.clear();
        debug!(depth = self.undo.len(), "saved undo snapshot");
        Ok(())
    }

    /// Steps to switch to, or `None` when there is nothing to undo.
    ///
    /// Snapshots identical to `current` would be a no-op undo and are
    /// dropped on the way.
    pub fn undo(&mut self, current: &[Step]) -> Result<Option<Vec<Step>>, HistoryError> {
        Self::step(&mut self.undo, &mut self.redo, current)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: &[Step]) -> Result<Option<Vec<Step>>, HistoryError> {
        Self::step(&mut self.redo, &mut self.undo, current)
    }

    fn step(
        from: &mut VecDeque<Snapshot>,
        to: &mut VecDeque<Snapshot>,
        current: &[Step],
    ) -> Result<Option<Vec<Step>>, HistoryError> {
        let now = Snapshot::take(current)?;
        while from.back() == Some(&now) {
            from.pop_back();
        }
        let Some(top) = from.back() else {
            return Ok(None);
        };
        let restored = top.restore()?;
        from.pop_back();
        push_bounded(to, now);
        Ok(Some(restored))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
