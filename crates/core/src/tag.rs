// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint tag: a totally ordered position on the event feed.
//!
//! Mirrors the event store's own `(commit, prepare)` position pair so a tag
//! round-trips exactly through the checkpoint manager and through
//! `StateUpdated` metadata without any lossy remapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, totally ordered position on the event feed.
///
/// `Ord` is derived directly: `commit_position` dominates, `prepare_position`
/// breaks ties within a single commit. [`CheckpointTag::zero`] precedes every
/// position a real event can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckpointTag {
    pub commit_position: u64,
    pub prepare_position: u64,
}

impl CheckpointTag {
    /// The distinguished tag that precedes every real position.
    ///
    /// Minted by the position tagger (component B), never observed on a
    /// real committed event.
    pub const fn zero() -> Self {
        Self { commit_position: 0, prepare_position: 0 }
    }

    pub const fn new(commit_position: u64, prepare_position: u64) -> Self {
        Self { commit_position, prepare_position }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Default for CheckpointTag {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for CheckpointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C:{}/P:{}", self.commit_position, self.prepare_position)
    }
}

/// The metadata key a `StateUpdated` emission carries its tag under, so the
/// backward-scan recovery path can parse it back out of a persisted event's
/// metadata map.
pub const TAG_METADATA_KEY: &str = "tag";

/// `(id, epoch, version)` triple used to validate a persisted checkpoint
/// payload against the currently running projection definition.
///
/// A payload whose version doesn't match the current one is treated as
/// absent — the projection starts from [`CheckpointTag::zero`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionVersion {
    pub id: String,
    pub epoch: u64,
    pub version: u32,
}

impl ProjectionVersion {
    pub fn new(id: impl Into<String>, epoch: u64, version: u32) -> Self {
        Self { id: id.into(), epoch, version }
    }

    /// Whether a persisted version matches this running version closely
    /// enough that its tag/state payload should be trusted.
    pub fn matches(&self, other: &ProjectionVersion) -> bool {
        self.id == other.id && self.epoch == other.epoch && self.version == other.version
    }
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
