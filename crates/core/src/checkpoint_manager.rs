// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable checkpoint write contract.

use crate::tag::{CheckpointTag, ProjectionVersion};
use crate::work_item::EmittedEvent;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint write failed: {0}")]
    WriteFailed(String),
    #[error("checkpoint read failed: {0}")]
    ReadFailed(String),
}

/// A persisted checkpoint: the position the projection has fully processed
/// through, plus the version it was written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub tag: CheckpointTag,
    pub version: ProjectionVersion,
}

/// External, durable contract the runtime calls to persist and recover its
/// position. Implementations must make `write` at-least-once durable before
/// returning `Ok`; the runtime treats a write error as fatal for the
/// projection (it does not retry silently).
///
/// `write` persists both the checkpoint marker and the emission batch that
/// produced it atomically per work item — the same single contract the
/// recovery path on the other end reads `StateUpdated` events back out of.
/// An empty `emitted` slice is the common case (most checkpoints mark
/// progress without any derived events attached).
#[async_trait]
pub trait CheckpointManager: Send + Sync {
    async fn load(&self) -> Result<Option<Checkpoint>, CheckpointError>;

    async fn write(&self, checkpoint: &Checkpoint, emitted: &[EmittedEvent]) -> Result<(), CheckpointError>;
}
