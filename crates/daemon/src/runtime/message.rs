// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal messages that drive the runtime's single event loop: the
//! public bus events plus the asynchronous completions of work the
//! executor dispatched on the runtime's behalf.

use projection_core::{BackwardPage, Checkpoint, CheckpointError, ProjectionEvent, ReadError};

/// An outstanding backward read, recorded so its reply can be matched back
/// to the partition and tag it was issued for (see design note on
/// cooperative suspension).
#[derive(Debug, Clone)]
pub struct PendingPartitionLoad {
    pub partition: String,
    pub tag: projection_core::CheckpointTag,
    pub stream: String,
    pub accumulated_exhausted_search: Vec<projection_core::CommittedEvent>,
}

#[derive(Debug)]
pub enum RuntimeMessage {
    Bus(ProjectionEvent),
    CheckpointLoaded(Result<Option<Checkpoint>, CheckpointError>),
    CheckpointWritten { result: Result<(), CheckpointError>, is_stop_flush: bool, tag: projection_core::CheckpointTag },
    BackwardPageRead { request_id: u64, result: Result<BackwardPage, ReadError> },
}
