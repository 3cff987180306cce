// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items: the unit of queued work inside the core projection queue.

use crate::tag::CheckpointTag;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single committed event read off the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEvent {
    pub event_position: CheckpointTag,
    pub stream_id: String,
    pub event_type: String,
    pub category: String,
    pub event_id: String,
    pub sequence_number: u64,
    pub metadata: HashMap<String, String>,
    pub data: Vec<u8>,
}

/// A progress report from the subscription (e.g. percent-of-stream-read).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: f32,
}

/// One unit of queued work, tagged with the position it was admitted at.
///
/// Work items are immutable once enqueued; `kind` carries whatever payload
/// that kind of work needs to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub tag: CheckpointTag,
    pub kind: WorkKind,
}

impl WorkItem {
    pub fn committed(tag: CheckpointTag, event: CommittedEvent) -> Self {
        Self { tag, kind: WorkKind::Committed(event) }
    }

    pub fn progress(tag: CheckpointTag, progress: Progress) -> Self {
        Self { tag, kind: WorkKind::Progress(progress) }
    }

    pub fn checkpoint_suggested(tag: CheckpointTag) -> Self {
        Self { tag, kind: WorkKind::CheckpointSuggested }
    }

    /// `request_id` correlates this query with the runtime's outstanding
    /// get-state reply table; the query itself bypasses tag ordering.
    pub fn get_state(partition: String, request_id: u64) -> Self {
        Self { tag: CheckpointTag::zero(), kind: WorkKind::GetState { partition, request_id } }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkKind {
    Committed(CommittedEvent),
    Progress(Progress),
    CheckpointSuggested,
    GetState { partition: String, request_id: u64 },
}

impl WorkKind {
    pub fn name(&self) -> &'static str {
        match self {
            WorkKind::Committed(_) => "committed",
            WorkKind::Progress(_) => "progress",
            WorkKind::CheckpointSuggested => "checkpoint_suggested",
            WorkKind::GetState { .. } => "get_state",
        }
    }

    /// Out-of-order work bypasses tag-ordered admission entirely (§4.D.3).
    pub fn is_out_of_order(&self) -> bool {
        matches!(self, WorkKind::GetState { .. })
    }
}

/// A derived event produced by the handler, pending persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub stream: String,
    pub event_id: String,
    pub event_type: String,
    pub data: Vec<u8>,
    pub metadata: HashMap<String, String>,
}

impl EmittedEvent {
    /// A derived event with no metadata attached.
    pub fn new(stream: impl Into<String>, event_id: impl Into<String>, event_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { stream: stream.into(), event_id: event_id.into(), event_type: event_type.into(), data, metadata: HashMap::new() }
    }
}
