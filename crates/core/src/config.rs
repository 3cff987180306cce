// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projection configuration.

use crate::tag::ProjectionVersion;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the runtime writes a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointMode {
    /// Write a checkpoint after every committed event.
    Every,
    /// Write a checkpoint only when the event store suggests one.
    OnSuggestion,
    /// Write a checkpoint at most once per interval, driven by `Tick`.
    Interval,
}

/// Static configuration for a running projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub version: ProjectionVersion,
    pub checkpoint_mode: CheckpointMode,
    #[serde(with = "duration_millis")]
    pub checkpoint_interval: Duration,
    pub backward_page_size: u32,
    pub partition_cache_capacity: usize,
    /// If false, `CheckpointSuggested` is ignored.
    pub checkpoints_enabled: bool,
    /// If false and the handler emits an event, the runtime faults.
    pub emit_event_enabled: bool,
    /// Whether `StateUpdated` events are emitted for cache recovery.
    pub publish_state_updates: bool,
    /// Queue-depth pressure knob.
    pub pending_events_threshold: usize,
    /// Passed through to the subscriber as its own pressure knob.
    pub checkpoint_unhandled_bytes_threshold: usize,
}

impl ProjectionConfig {
    pub fn new(version: ProjectionVersion) -> Self {
        Self {
            version,
            checkpoint_mode: CheckpointMode::OnSuggestion,
            checkpoint_interval: Duration::from_secs(1),
            backward_page_size: 20,
            partition_cache_capacity: 10_000,
            checkpoints_enabled: true,
            emit_event_enabled: true,
            publish_state_updates: true,
            pending_events_threshold: 1_000,
            checkpoint_unhandled_bytes_threshold: 16 * 1024 * 1024,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
