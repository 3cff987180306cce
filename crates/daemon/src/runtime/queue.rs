// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered work queue: admits work items only in non-decreasing tag
//! order (with an explicit exception for same-tag progress reports), and
//! bypasses ordering entirely for out-of-order get-state queries.

use projection_core::{CheckpointTag, WorkItem};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("tag {tag} is behind last admitted tag {last_admitted}")]
    OutOfOrder { tag: CheckpointTag, last_admitted: CheckpointTag },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRunState {
    Running,
    Paused,
    Stopped,
}

/// Ordered sequence of admitted work items plus the admission watermark.
#[derive(Debug)]
pub struct CoreProjectionQueue {
    items: VecDeque<WorkItem>,
    last_admitted_tag: CheckpointTag,
    run_state: QueueRunState,
}

impl Default for CoreProjectionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreProjectionQueue {
    pub fn new() -> Self {
        Self { items: VecDeque::new(), last_admitted_tag: CheckpointTag::zero(), run_state: QueueRunState::Stopped }
    }

    /// Reset the watermark to `zero_tag` and clear all items.
    pub fn initialize_queue(&mut self, zero_tag: CheckpointTag) {
        self.items.clear();
        self.last_admitted_tag = zero_tag;
    }

    /// Admit `item` at `tag`; fails if `tag < last_admitted_tag` unless
    /// `allow_current` permits `tag == last_admitted_tag` (progress reports).
    pub fn enqueue(&mut self, item: WorkItem, tag: CheckpointTag, allow_current: bool) -> Result<(), QueueError> {
        let admissible = if allow_current { tag >= self.last_admitted_tag } else { tag > self.last_admitted_tag };
        if !admissible {
            return Err(QueueError::OutOfOrder { tag, last_admitted: self.last_admitted_tag });
        }
        self.last_admitted_tag = tag;
        self.items.push_back(item);
        Ok(())
    }

    /// Admit `item` regardless of tag order — used for state queries, which
    /// bypass the ordered admission path entirely.
    pub fn enqueue_out_of_order(&mut self, item: WorkItem) {
        self.items.push_front(item);
    }

    pub fn set_running(&mut self) {
        self.run_state = QueueRunState::Running;
    }

    pub fn set_paused(&mut self) {
        self.run_state = QueueRunState::Paused;
    }

    pub fn set_stopped(&mut self) {
        self.run_state = QueueRunState::Stopped;
    }

    pub fn run_state(&self) -> QueueRunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == QueueRunState::Running
    }

    pub fn buffered_event_count(&self) -> usize {
        self.items.len()
    }

    pub fn last_admitted_tag(&self) -> CheckpointTag {
        self.last_admitted_tag
    }

    /// Pop the next item for processing, if the queue is running and
    /// non-empty.
    pub fn pop_next(&mut self) -> Option<WorkItem> {
        if !self.is_running() {
            return None;
        }
        self.items.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.items.is_empty()
    }
}
