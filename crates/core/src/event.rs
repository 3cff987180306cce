// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus messages consumed by the runtime.

use crate::tag::{CheckpointTag, ProjectionVersion};
use crate::work_item::{CommittedEvent, Progress};
use serde::{Deserialize, Serialize};

/// A message the runtime reacts to.
///
/// `Tick` is coalesced by the runtime's dispatch loop: at most one `Tick`
/// is ever in flight, regardless of how many are posted. The three
/// subscription-origin variants carry the subscription's own
/// `subscription_message_sequence_number` so the sequence guard can discard
/// stale or replayed deliveries before anything else sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionEvent {
    CommittedEventReceived { seq: u64, event: CommittedEvent },
    ProgressChanged { seq: u64, progress: Progress },
    CheckpointSuggested { seq: u64, tag: CheckpointTag },
    CheckpointLoaded { tag: CheckpointTag, version: Option<ProjectionVersion> },
    CheckpointCompleted { tag: CheckpointTag },
    PauseRequested,
    RestartRequested,
    GetState { partition: String, request_id: u64 },
    Tick,
}

/// The result of parsing a persisted checkpoint payload: the version it
/// claims to carry, the tag it parsed (`None` for an empty payload), and
/// whatever other fields rode along that this runtime doesn't know about.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCheckpoint {
    pub version: ProjectionVersion,
    pub tag: Option<CheckpointTag>,
    pub extra_metadata: serde_json::Map<String, serde_json::Value>,
}

/// Parse a JSON-serialized [`CheckpointTag`], such as the one a
/// `StateUpdated` emission carries in its metadata. Empty input parses to
/// `None` rather than an error — an event with no tag metadata yet is valid
/// input, not malformed input.
pub fn parse_tag(json: &[u8]) -> Result<Option<CheckpointTag>, serde_json::Error> {
    if json.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(json).map(Some)
}

/// Parse a persisted checkpoint payload against the projection version
/// currently running. Empty `bytes` is the "nothing written yet" case: it
/// yields `{ version: current_version, tag: None }` with no extra metadata,
/// rather than an error, so a fresh checkpoint file needs no special-casing
/// by callers.
pub fn parse_tag_with_version(
    bytes: &[u8],
    current_version: &ProjectionVersion,
) -> Result<ParsedCheckpoint, serde_json::Error> {
    if bytes.is_empty() {
        return Ok(ParsedCheckpoint { version: current_version.clone(), tag: None, extra_metadata: serde_json::Map::new() });
    }

    let mut value: serde_json::Value = serde_json::from_slice(bytes)?;
    let tag: Option<CheckpointTag> = match value.get_mut("tag").map(serde_json::Value::take) {
        Some(serde_json::Value::Null) | None => None,
        Some(tag_value) => Some(serde_json::from_value(tag_value)?),
    };
    let version = match value.get_mut("version").map(serde_json::Value::take) {
        Some(version_value) => serde_json::from_value(version_value)?,
        None => current_version.clone(),
    };
    let extra_metadata = match value {
        serde_json::Value::Object(mut map) => {
            map.remove("tag");
            map.remove("version");
            map
        }
        _ => serde_json::Map::new(),
    };

    Ok(ParsedCheckpoint { version, tag, extra_metadata })
}

impl ProjectionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionEvent::CommittedEventReceived { .. } => "committed_event_received",
            ProjectionEvent::ProgressChanged { .. } => "progress_changed",
            ProjectionEvent::CheckpointSuggested { .. } => "checkpoint_suggested",
            ProjectionEvent::CheckpointLoaded { .. } => "checkpoint_loaded",
            ProjectionEvent::CheckpointCompleted { .. } => "checkpoint_completed",
            ProjectionEvent::PauseRequested => "pause_requested",
            ProjectionEvent::RestartRequested => "restart_requested",
            ProjectionEvent::GetState { .. } => "get_state",
            ProjectionEvent::Tick => "tick",
        }
    }

    /// Whether this message originates from the event-store subscription
    /// (and therefore must pass the sequence guard) as opposed to the
    /// checkpoint manager or an admin caller.
    pub fn is_subscription_origin(&self) -> bool {
        matches!(
            self,
            ProjectionEvent::CommittedEventReceived { .. }
                | ProjectionEvent::ProgressChanged { .. }
                | ProjectionEvent::CheckpointSuggested { .. }
        )
    }

    /// The subscription sequence number, for subscription-origin messages.
    pub fn sequence_number(&self) -> Option<u64> {
        match self {
            ProjectionEvent::CommittedEventReceived { seq, .. } => Some(*seq),
            ProjectionEvent::ProgressChanged { seq, .. } => Some(*seq),
            ProjectionEvent::CheckpointSuggested { seq, .. } => Some(*seq),
            _ => None,
        }
    }
}
