// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

pub use crate::bus::test_support::RecordingBus;

use crate::tag::CheckpointTag;
use crate::work_item::CommittedEvent;
use std::collections::HashMap;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core domain types.
pub mod strategies {
    use crate::tag::CheckpointTag;
    use proptest::prelude::*;

    pub fn arb_tag() -> impl Strategy<Value = CheckpointTag> {
        (any::<u64>(), any::<u64>()).prop_map(|(c, p)| CheckpointTag::new(c, p))
    }

    /// A strictly increasing sequence of tags, as a subscription would
    /// actually deliver them.
    pub fn arb_ascending_tags(len: usize) -> impl Strategy<Value = Vec<CheckpointTag>> {
        proptest::collection::vec(1u64..1000, len).prop_map(|deltas| {
            let mut commit = 0u64;
            deltas
                .into_iter()
                .map(|delta| {
                    commit += delta;
                    CheckpointTag::new(commit, 0)
                })
                .collect()
        })
    }
}

// ── Event factory functions ─────────────────────────────────────────────

pub fn committed_event(tag: CheckpointTag, stream_id: &str, event_type: &str) -> CommittedEvent {
    CommittedEvent {
        event_position: tag,
        stream_id: stream_id.to_string(),
        event_type: event_type.to_string(),
        category: stream_id.split('-').next().unwrap_or(stream_id).to_string(),
        event_id: format!("evt-{}-{}", tag.commit_position, tag.prepare_position),
        sequence_number: tag.commit_position,
        metadata: HashMap::new(),
        data: b"{}".to_vec(),
    }
}
