// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A JSON-lines event log backing a [`BackwardReader`] for tests and local
//! runs, grounded in the same append-and-replay shape as a write-ahead log.

use async_trait::async_trait;
use parking_lot::Mutex;
use projection_core::{BackwardPage, BackwardReader, CheckpointTag, CommittedEvent, ReadError};

/// An in-memory, append-only log of committed events, paginated backward
/// from a given tag.
#[derive(Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<CommittedEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: CommittedEvent) {
        self.events.lock().push(event);
    }
}

#[async_trait]
impl BackwardReader for MemoryEventLog {
    async fn read_page(
        &self,
        stream: &str,
        from: CheckpointTag,
        page_size: u32,
    ) -> Result<BackwardPage, ReadError> {
        let events = self.events.lock();
        let mut matching: Vec<&CommittedEvent> =
            events.iter().filter(|e| e.stream_id == stream && e.event_position < from).collect();
        matching.sort_by_key(|e| std::cmp::Reverse(e.event_position));

        let page_size = page_size as usize;
        let page: Vec<CommittedEvent> = matching.iter().take(page_size).map(|e| (*e).clone()).collect();
        let exhausted = matching.len() <= page_size;
        Ok(BackwardPage { events: page, exhausted })
    }
}
