// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime-reported statistics.

use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of runtime throughput and queue depth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub events_processed: u64,
    pub events_per_second: f64,
    pub queue_depth: usize,
    pub partitions_cached: usize,
    pub last_checkpoint: Option<String>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events_processed += 1;
    }
}
