// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus messages published by the runtime.

use crate::statistics::Statistics;
use crate::tag::CheckpointTag;
use serde::{Deserialize, Serialize};

/// An outbound message the runtime publishes to its bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionEffect {
    SubscribeProjection { from: CheckpointTag },
    UnsubscribeProjection,
    Started,
    Stopped,
    Faulted { reason: String },
    StatisticsReport(Statistics),
    Tick,
    /// Request a backward page of history for the named partition, to seed
    /// its cached state before it can be unlocked.
    LoadPartitionRequested { partition: String, request_id: u64, from: CheckpointTag },
}

impl ProjectionEffect {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionEffect::SubscribeProjection { .. } => "subscribe_projection",
            ProjectionEffect::UnsubscribeProjection => "unsubscribe_projection",
            ProjectionEffect::Started => "started",
            ProjectionEffect::Stopped => "stopped",
            ProjectionEffect::Faulted { .. } => "faulted",
            ProjectionEffect::StatisticsReport(_) => "statistics_report",
            ProjectionEffect::Tick => "tick",
            ProjectionEffect::LoadPartitionRequested { .. } => "load_partition_requested",
        }
    }
}
