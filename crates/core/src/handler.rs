// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The handler contract implemented by a concrete projection.

use crate::tag::CheckpointTag;
use crate::work_item::{CommittedEvent, EmittedEvent};
use thiserror::Error;

/// Context passed to the handler for a single committed event.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub partition: String,
    pub tag: CheckpointTag,
    pub event: CommittedEvent,
}

/// What the handler produced for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionHandlerOutput {
    /// Whether this event applied to the projection at all. A handler may
    /// decide an event is irrelevant (wrong category, filtered stream) and
    /// return `processed: false`, in which case no emission batch is
    /// scheduled even if `emitted` is non-empty.
    pub processed: bool,
    pub state: Option<Vec<u8>>,
    pub emitted: Vec<EmittedEvent>,
}

impl ProjectionHandlerOutput {
    /// The event was filtered out; nothing changed.
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn with_state(state: Vec<u8>) -> Self {
        Self { processed: true, state: Some(state), emitted: Vec::new() }
    }

    pub fn with_emitted(mut self, emitted: Vec<EmittedEvent>) -> Self {
        self.emitted = emitted;
        self
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler rejected event {event_id}: {reason}")]
    Rejected { event_id: String, reason: String },
    #[error("handler panicked while processing event {event_id}")]
    Panicked { event_id: String },
}

/// A projection's business logic: fold one committed event, starting from
/// the partition's current cached state, into a new state plus any events
/// to emit.
///
/// Implementations must be pure given `(state, event)`; the runtime is
/// responsible for everything about ordering, caching, and durability.
pub trait ProjectionHandler: Send + Sync {
    fn handle(
        &self,
        state: Option<&[u8]>,
        ctx: &EventContext,
    ) -> Result<ProjectionHandlerOutput, HandlerError>;
}
