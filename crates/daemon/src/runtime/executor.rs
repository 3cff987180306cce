// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches effects that require I/O. Everything here runs off the
//! runtime's single logical thread: results come back as messages on
//! `reply_tx`, never by directly touching runtime state.

use super::message::RuntimeMessage;
use projection_core::{
    BackwardReader, Checkpoint, CheckpointManager, CheckpointTag, EmittedEvent, ProjectionBus, ProjectionEffect,
};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum RuntimeEffect {
    Publish(ProjectionEffect),
    LoadCheckpoint,
    WriteCheckpoint { checkpoint: Checkpoint, emitted: Vec<EmittedEvent> },
    FlushCheckpointToStop(Option<Checkpoint>),
    ReadBackwardPage { request_id: u64, stream: String, from: CheckpointTag, page_size: u32 },
}

pub struct Executor {
    checkpoint_manager: Arc<dyn CheckpointManager>,
    backward_reader: Arc<dyn BackwardReader>,
    bus: Arc<dyn ProjectionBus>,
    reply_tx: mpsc::Sender<RuntimeMessage>,
}

impl Executor {
    pub fn new(
        checkpoint_manager: Arc<dyn CheckpointManager>,
        backward_reader: Arc<dyn BackwardReader>,
        bus: Arc<dyn ProjectionBus>,
        reply_tx: mpsc::Sender<RuntimeMessage>,
    ) -> Self {
        Self { checkpoint_manager, backward_reader, bus, reply_tx }
    }

    pub fn execute(&self, effect: RuntimeEffect) {
        let op = effect_name(&effect);
        tracing::info!(effect = op, "executing effect");

        match effect {
            RuntimeEffect::Publish(projection_effect) => {
                self.bus.publish(projection_effect);
            }
            RuntimeEffect::LoadCheckpoint => {
                let manager = self.checkpoint_manager.clone();
                let reply_tx = self.reply_tx.clone();
                tokio::spawn(async move {
                    let result = manager.load().await;
                    if let Err(e) = &result {
                        tracing::error!(error = %e, "checkpoint load failed");
                    }
                    let _ = reply_tx.send(RuntimeMessage::CheckpointLoaded(result)).await;
                });
            }
            RuntimeEffect::WriteCheckpoint { checkpoint, emitted } => {
                let manager = self.checkpoint_manager.clone();
                let reply_tx = self.reply_tx.clone();
                tokio::spawn(async move {
                    let tag = checkpoint.tag;
                    let result = manager.write(&checkpoint, &emitted).await;
                    let _ = reply_tx
                        .send(RuntimeMessage::CheckpointWritten { result, is_stop_flush: false, tag })
                        .await;
                });
            }
            RuntimeEffect::FlushCheckpointToStop(checkpoint) => {
                let manager = self.checkpoint_manager.clone();
                let reply_tx = self.reply_tx.clone();
                tokio::spawn(async move {
                    let tag = checkpoint.as_ref().map(|c| c.tag).unwrap_or_else(CheckpointTag::zero);
                    let result = match &checkpoint {
                        Some(checkpoint) => manager.write(checkpoint, &[]).await,
                        // Flush must always complete even with nothing to write.
                        None => Ok(()),
                    };
                    let _ = reply_tx
                        .send(RuntimeMessage::CheckpointWritten { result, is_stop_flush: true, tag })
                        .await;
                });
            }
            RuntimeEffect::ReadBackwardPage { request_id, stream, from, page_size } => {
                let reader = self.backward_reader.clone();
                let reply_tx = self.reply_tx.clone();
                tokio::spawn(async move {
                    let result = reader.read_page(&stream, from, page_size).await;
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, request_id, "backward read failed");
                    }
                    let _ = reply_tx.send(RuntimeMessage::BackwardPageRead { request_id, result }).await;
                });
            }
        }
    }
}

fn effect_name(effect: &RuntimeEffect) -> &'static str {
    match effect {
        RuntimeEffect::Publish(e) => e.name(),
        RuntimeEffect::LoadCheckpoint => "load_checkpoint",
        RuntimeEffect::WriteCheckpoint { .. } => "write_checkpoint",
        RuntimeEffect::FlushCheckpointToStop(_) => "flush_checkpoint_to_stop",
        RuntimeEffect::ReadBackwardPage { .. } => "read_backward_page",
    }
}
