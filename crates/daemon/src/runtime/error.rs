// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while driving the runtime. None of these ever escape the
//! runtime boundary: every variant is caught at the point the offending
//! message was handled and turned into a `Faulted`/`FaultedStopping`
//! transition with the error's message as the fault reason.

use projection_core::CheckpointTag;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("message received in state {state:?}, which forbids it")]
    InvalidState { state: &'static str },

    #[error("handler for event {event_id} at {tag} failed: {source}")]
    Handler { event_id: String, tag: CheckpointTag, #[source] source: projection_core::HandlerError },

    #[error("emit not allowed by the projection/configuration/mode")]
    EmitNotAllowed,

    #[error("state load failed: {0}")]
    StateLoad(String),

    #[error("checkpoint manager error: {0}")]
    Checkpoint(#[from] projection_core::CheckpointError),

    #[error("backward read failed: {0}")]
    Read(#[from] projection_core::ReadError),

    #[error("partition cache error: {0}")]
    Cache(String),
}

impl RuntimeError {
    /// Kind 3 errors (state-load failure) skip the `*Stopping` flush and go
    /// straight to `Faulted` — there is no in-flight work to preserve.
    pub fn skips_flush(&self) -> bool {
        matches!(self, RuntimeError::StateLoad(_))
    }
}
