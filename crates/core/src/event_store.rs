// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External read contracts the runtime depends on: paginated backward reads
//! for partition seeding, and partition routing for incoming events.

use crate::tag::CheckpointTag;
use crate::work_item::CommittedEvent;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("backward read failed: {0}")]
    Failed(String),
}

/// Default page size used when a caller doesn't override it (mirrors
/// [`crate::config::ProjectionConfig::backward_page_size`]'s default).
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A page of events read backward from a position, oldest-requested-first
/// in terms of the read direction (i.e. events strictly preceding `from`).
#[derive(Debug, Clone, Default)]
pub struct BackwardPage {
    pub events: Vec<CommittedEvent>,
    /// `true` when this page reached the start of the stream.
    pub exhausted: bool,
}

/// External contract for paginated backward reads, used to seed a
/// partition's cached state before it can be unlocked for forward writes.
#[async_trait]
pub trait BackwardReader: Send + Sync {
    async fn read_page(
        &self,
        stream: &str,
        from: CheckpointTag,
        page_size: u32,
    ) -> Result<BackwardPage, ReadError>;
}

/// Routes a committed event to the partition key that owns it.
pub trait PartitionSelector: Send + Sync {
    fn select(&self, event: &CommittedEvent) -> String;
}

/// A selector that routes every event to the root (unpartitioned) state.
pub struct RootOnlySelector;

impl PartitionSelector for RootOnlySelector {
    fn select(&self, _event: &CommittedEvent) -> String {
        crate::partition::ROOT_PARTITION.to_string()
    }
}
