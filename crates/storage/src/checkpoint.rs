// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed reference implementation of the checkpoint write contract.
//!
//! Writes are atomic: the new payload lands in a temp file next to the
//! target, the previous payload is rotated into a `.bak` file, then the
//! temp file is renamed into place. A crash between the write and the
//! rename leaves the prior checkpoint intact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use projection_core::{Checkpoint, CheckpointError, CheckpointManager, CheckpointTag, EmittedEvent, ProjectionVersion};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CURRENT_PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum FileCheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FileCheckpointError> for CheckpointError {
    fn from(err: FileCheckpointError) -> Self {
        match &err {
            FileCheckpointError::Io(_) => CheckpointError::WriteFailed(err.to_string()),
            FileCheckpointError::Json(_) => CheckpointError::ReadFailed(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Payload {
    #[serde(rename = "v")]
    payload_version: u32,
    tag: CheckpointTag,
    version: ProjectionVersion,
    written_at: DateTime<Utc>,
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// A [`CheckpointManager`] backed by a single JSON file on disk.
///
/// A persisted payload whose [`ProjectionVersion`] doesn't match the one
/// this manager was constructed with is treated as absent — `load` returns
/// `Ok(None)` rather than surfacing a stale checkpoint to a projection that
/// has since changed shape.
pub struct FileCheckpointManager {
    path: PathBuf,
    expected_version: ProjectionVersion,
    write_lock: Mutex<()>,
}

impl FileCheckpointManager {
    pub fn new(path: impl Into<PathBuf>, expected_version: ProjectionVersion) -> Self {
        Self { path: path.into(), expected_version, write_lock: Mutex::new(()) }
    }

    fn read_payload(&self) -> Result<Option<Payload>, FileCheckpointError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write_payload(&self, payload: &Payload) -> Result<(), FileCheckpointError> {
        let _guard = self.write_lock.lock();
        if self.path.exists() {
            let bak = rotate_bak_path(&self.path);
            fs::rename(&self.path, bak)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(payload)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn events_log_path(&self) -> PathBuf {
        self.path.with_extension("events.jsonl")
    }

    /// Appends one JSON line per emitted event, the same append-only shape
    /// as the rest of this crate's event log. Held under `write_lock` so it
    /// serializes with the checkpoint payload write it accompanies.
    fn append_emissions(&self, emitted: &[EmittedEvent]) -> Result<(), FileCheckpointError> {
        if emitted.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(self.events_log_path())?;
        for event in emitted {
            let mut line = serde_json::to_vec(event)?;
            line.push(b'\n');
            file.write_all(&line)?;
        }
        file.flush()?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointManager for FileCheckpointManager {
    async fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let payload = self.read_payload().map_err(CheckpointError::from)?;
        Ok(payload.and_then(|p| {
            if p.version.matches(&self.expected_version) {
                Some(Checkpoint { tag: p.tag, version: p.version })
            } else {
                tracing::warn!(
                    persisted = ?p.version,
                    expected = ?self.expected_version,
                    "discarding checkpoint written under a different projection version"
                );
                None
            }
        }))
    }

    async fn write(&self, checkpoint: &Checkpoint, emitted: &[EmittedEvent]) -> Result<(), CheckpointError> {
        let payload = Payload {
            payload_version: CURRENT_PAYLOAD_VERSION,
            tag: checkpoint.tag,
            version: checkpoint.version.clone(),
            written_at: Utc::now(),
        };
        self.append_emissions(emitted).map_err(CheckpointError::from)?;
        self.write_payload(&payload).map_err(CheckpointError::from)?;
        tracing::info!(tag = %checkpoint.tag, emitted = emitted.len(), "checkpoint written");
        Ok(())
    }
}
