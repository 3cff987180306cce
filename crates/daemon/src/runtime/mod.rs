// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The projection runtime: ties the lifecycle state machine, the ordered
//! work queue, the partition cache, and the checkpoint manager contract
//! together into the single-threaded, message-driven loop described by
//! the external interfaces.

pub mod cache;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod message;
pub mod queue;
pub mod sequence_guard;

pub use cache::{CacheError, PartitionStateCache};
pub use error::RuntimeError;
pub use executor::{Executor, RuntimeEffect};
pub use lifecycle::LifecycleState;
pub use message::{PendingPartitionLoad, RuntimeMessage};
pub use queue::{CoreProjectionQueue, QueueError};
pub use sequence_guard::SubscriptionSequenceGuard;

use projection_core::{
    parse_tag, CheckpointTag, Clock, CommittedEvent, EmittedEvent, EventContext, PartitionSelector, ProjectionConfig,
    ProjectionEffect, ProjectionEvent, ProjectionHandler, ROOT_PARTITION, Statistics, SystemClock, TAG_METADATA_KEY,
    WorkItem, WorkKind,
};
use std::collections::HashMap;
use std::sync::Arc;

fn partition_stream(projection_name: &str, partition: &str) -> String {
    if partition == ROOT_PARTITION {
        format!("$projections-{projection_name}-state")
    } else {
        format!("$projections-{projection_name}-{partition}-state")
    }
}

fn checkpoint_stream(projection_name: &str) -> String {
    format!("$projections-{projection_name}-checkpoint")
}

const STATE_UPDATED_EVENT_TYPE: &str = "StateUpdated";

/// Drives one running projection. Owns its queue, cache, and sequence
/// guard exclusively; the only shared resource is the bus the executor
/// publishes onto.
///
/// Generic over the handler and the clock so tests can swap in
/// [`projection_core::FakeClock`] to assert on `events_per_second` without
/// sleeping.
pub struct Runtime<H: ProjectionHandler, C: Clock = SystemClock> {
    name: String,
    handler: H,
    partition_selector: Arc<dyn PartitionSelector>,
    config: ProjectionConfig,
    executor: Executor,
    clock: C,

    state: LifecycleState,
    fault_reason: Option<String>,
    cache: PartitionStateCache,
    queue: CoreProjectionQueue,
    sequence_guard: SubscriptionSequenceGuard,
    tick_pending: bool,
    statistics: Statistics,
    stats_window_started_ms: u64,
    stats_window_started_count: u64,

    loaded_partition: Option<String>,
    next_request_id: u64,
    load_state_requests: HashMap<u64, PendingPartitionLoad>,
    parked_items: HashMap<u64, WorkItem>,
    /// Set while a partition's backward read is outstanding: the queue is
    /// paused so later items cannot jump ahead of the parked one.
    load_suspended: bool,

    /// Most recently observed tag, carried into a flush if one is requested
    /// before a normal checkpoint write lands.
    last_tag: CheckpointTag,
}

impl<H: ProjectionHandler> Runtime<H, SystemClock> {
    pub fn new(
        name: impl Into<String>,
        handler: H,
        partition_selector: Arc<dyn PartitionSelector>,
        config: ProjectionConfig,
        executor: Executor,
    ) -> Self {
        Self::with_clock(name, handler, partition_selector, config, executor, SystemClock)
    }
}

impl<H: ProjectionHandler, C: Clock> Runtime<H, C> {
    pub fn with_clock(
        name: impl Into<String>,
        handler: H,
        partition_selector: Arc<dyn PartitionSelector>,
        config: ProjectionConfig,
        executor: Executor,
        clock: C,
    ) -> Self {
        let stats_window_started_ms = clock.epoch_ms();
        Self {
            name: name.into(),
            handler,
            partition_selector,
            config,
            executor,
            clock,
            state: LifecycleState::Initial,
            fault_reason: None,
            cache: PartitionStateCache::new(),
            queue: CoreProjectionQueue::new(),
            sequence_guard: SubscriptionSequenceGuard::new(),
            tick_pending: false,
            statistics: Statistics::new(),
            stats_window_started_ms,
            stats_window_started_count: 0,
            loaded_partition: None,
            next_request_id: 0,
            load_state_requests: HashMap::new(),
            parked_items: HashMap::new(),
            load_suspended: false,
            last_tag: CheckpointTag::zero(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn fault_reason(&self) -> Option<&str> {
        self.fault_reason.as_deref()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn publish(&self, effect: ProjectionEffect) {
        self.executor.execute(RuntimeEffect::Publish(effect));
    }

    fn arm_tick(&mut self) {
        if !self.tick_pending && matches!(self.state, LifecycleState::Running | LifecycleState::Stopping | LifecycleState::FaultedStopping)
        {
            self.tick_pending = true;
            self.publish(ProjectionEffect::Tick);
        }
    }

    // ── External triggers ────────────────────────────────────────────

    /// `Start`: the only transition out of `Initial`.
    pub fn start(&mut self) {
        self.enter_initial();
        self.enter_load_state_requested();
    }

    /// `RestartRequested`: from any state, back to `Initial` then `Start`.
    pub fn restart(&mut self) {
        self.start();
    }

    /// Admin-requested resume out of `Paused`, mirroring `request_stop` as a
    /// direct call rather than a bus message (neither appears in the bus
    /// message list; both are admin-driven).
    pub fn resume(&mut self) {
        if let Err(err) = self.state.ensure(&[LifecycleState::Paused]) {
            self.fault(err.to_string(), false);
            return;
        }
        self.enter_resumed();
    }

    /// Admin-requested stop, from any of the states the subscription is
    /// live in.
    pub fn request_stop(&mut self) {
        if let Err(err) = self.state.ensure(&[
            LifecycleState::Running,
            LifecycleState::Paused,
            LifecycleState::Resumed,
            LifecycleState::StateLoadedSubscribed,
        ]) {
            self.fault(err.to_string(), false);
            return;
        }
        self.enter_stopping();
    }

    // ── Entry actions ────────────────────────────────────────────────

    fn enter_initial(&mut self) {
        self.state = LifecycleState::Initial;
        self.fault_reason = None;
        self.cache.initialize();
        self.queue.set_stopped();
        self.sequence_guard.disarm();
        self.tick_pending = false;
        self.loaded_partition = None;
        self.load_state_requests.clear();
        self.parked_items.clear();
    }

    fn enter_load_state_requested(&mut self) {
        self.state = LifecycleState::LoadStateRequested;
        self.executor.execute(RuntimeEffect::LoadCheckpoint);
    }

    fn enter_state_loaded_subscribed(&mut self, tag: CheckpointTag) {
        self.state = LifecycleState::StateLoadedSubscribed;
        self.queue.initialize_queue(tag);
        self.sequence_guard.arm();
        self.publish(ProjectionEffect::SubscribeProjection { from: tag });
        self.publish(ProjectionEffect::Started);
        self.enter_running();
    }

    fn enter_running(&mut self) {
        self.state = LifecycleState::Running;
        self.queue.set_running();
        self.arm_tick();
    }

    fn enter_paused(&mut self) {
        self.state = LifecycleState::Paused;
        self.queue.set_paused();
    }

    fn enter_resumed(&mut self) {
        self.state = LifecycleState::Resumed;
        self.enter_running();
    }

    fn enter_stopping(&mut self) {
        self.state = LifecycleState::Stopping;
        self.queue.set_paused();
        self.publish(ProjectionEffect::UnsubscribeProjection);
        self.flush_checkpoint_to_stop();
    }

    fn enter_faulted_stopping(&mut self, reason: String) {
        self.state = LifecycleState::FaultedStopping;
        self.fault_reason = Some(reason);
        self.queue.set_paused();
        self.publish(ProjectionEffect::UnsubscribeProjection);
        self.flush_checkpoint_to_stop();
    }

    fn enter_stopped(&mut self) {
        self.state = LifecycleState::Stopped;
        self.queue.set_stopped();
        self.publish(ProjectionEffect::Stopped);
    }

    fn enter_faulted(&mut self) {
        self.state = LifecycleState::Faulted;
        self.queue.set_stopped();
        let reason = self.fault_reason.clone().unwrap_or_default();
        self.publish(ProjectionEffect::Faulted { reason });
    }

    fn flush_checkpoint_to_stop(&mut self) {
        let checkpoint = projection_core::Checkpoint { tag: self.last_tag, version: self.config.version.clone() };
        self.executor.execute(RuntimeEffect::FlushCheckpointToStop(Some(checkpoint)));
    }

    /// Kind 1/2/4 faults: preserve in-flight work via the `*Stopping` flush.
    /// Kind 3 (state-load failure) skips straight to `Faulted`.
    fn fault(&mut self, reason: String, skip_flush: bool) {
        tracing::error!(projection = %self.name, reason, "projection faulted");
        if skip_flush {
            self.state = LifecycleState::FaultedStopping;
            self.fault_reason = Some(reason);
            self.enter_faulted();
        } else {
            self.enter_faulted_stopping(reason);
        }
    }

    // ── Message dispatch ─────────────────────────────────────────────

    pub fn handle_message(&mut self, message: RuntimeMessage) {
        let result = match message {
            RuntimeMessage::Bus(event) => self.handle_bus_event(event),
            RuntimeMessage::CheckpointLoaded(result) => self.handle_checkpoint_loaded(result),
            RuntimeMessage::CheckpointWritten { result, is_stop_flush, tag } => {
                self.handle_checkpoint_written(result, is_stop_flush, tag)
            }
            RuntimeMessage::BackwardPageRead { request_id, result } => {
                self.handle_backward_page(request_id, result)
            }
        };
        if let Err(err) = result {
            let skip_flush = err.skips_flush();
            self.fault(err.to_string(), skip_flush);
        }
    }

    fn handle_bus_event(&mut self, event: ProjectionEvent) -> Result<(), RuntimeError> {
        if event.is_subscription_origin() {
            let seq = event.sequence_number().expect("subscription-origin events carry a seq");
            if !self.sequence_guard.accept(seq) {
                tracing::debug!(seq, "discarding stale subscription message");
                return Ok(());
            }
        }

        match event {
            ProjectionEvent::CommittedEventReceived { event, .. } => self.on_committed_received(event),
            ProjectionEvent::ProgressChanged { progress, .. } => self.on_progress(progress),
            ProjectionEvent::CheckpointSuggested { .. } => self.on_checkpoint_suggested(),
            ProjectionEvent::PauseRequested => self.on_pause_requested(),
            ProjectionEvent::RestartRequested => {
                self.restart();
                Ok(())
            }
            ProjectionEvent::GetState { partition, request_id } => self.on_get_state(partition, request_id),
            ProjectionEvent::Tick => self.on_tick(),
            // A host that wires the checkpoint manager's replies onto the
            // same bus as subscription traffic (rather than the executor's
            // dedicated reply channel) delivers these here; route them
            // through the same handlers either path uses.
            ProjectionEvent::CheckpointLoaded { tag, version } => {
                let checkpoint = version.map(|version| projection_core::Checkpoint { tag, version });
                self.handle_checkpoint_loaded(Ok(checkpoint))
            }
            ProjectionEvent::CheckpointCompleted { tag } => {
                let is_stop_flush = matches!(self.state, LifecycleState::Stopping | LifecycleState::FaultedStopping);
                self.handle_checkpoint_written(Ok(()), is_stop_flush, tag)
            }
        }
    }

    fn on_committed_received(&mut self, event: CommittedEvent) -> Result<(), RuntimeError> {
        self.state.ensure(&[
            LifecycleState::StateLoadedSubscribed,
            LifecycleState::Running,
            LifecycleState::Paused,
            LifecycleState::Resumed,
            LifecycleState::Stopping,
            LifecycleState::FaultedStopping,
        ])?;
        let tag = event.event_position;
        let key = self.partition_selector.select(&event);
        let item = WorkItem::committed(tag, event);
        self.queue.enqueue(item, tag, false).map_err(|e| RuntimeError::StateLoad(e.to_string()))?;
        tracing::debug!(%tag, partition = %key, "admitted committed event");
        self.arm_tick();
        self.drain_if_running()
    }

    fn on_progress(&mut self, progress: projection_core::Progress) -> Result<(), RuntimeError> {
        self.state.ensure(&[
            LifecycleState::StateLoadedSubscribed,
            LifecycleState::Running,
            LifecycleState::Paused,
            LifecycleState::Resumed,
            LifecycleState::Stopping,
            LifecycleState::FaultedStopping,
        ])?;
        let tag = self.queue.last_admitted_tag();
        let item = WorkItem::progress(tag, progress);
        self.queue.enqueue(item, tag, true).map_err(|e| RuntimeError::StateLoad(e.to_string()))?;
        self.arm_tick();
        self.drain_if_running()
    }

    fn on_checkpoint_suggested(&mut self) -> Result<(), RuntimeError> {
        self.state.ensure(&[LifecycleState::Running, LifecycleState::Resumed])?;
        if !self.config.checkpoints_enabled {
            return Ok(());
        }
        let tag = self.queue.last_admitted_tag();
        self.queue.enqueue(WorkItem::checkpoint_suggested(tag), tag, true).ok();
        self.arm_tick();
        self.drain_if_running()
    }

    fn on_pause_requested(&mut self) -> Result<(), RuntimeError> {
        self.state.ensure(&[LifecycleState::Running])?;
        self.enter_paused();
        Ok(())
    }

    fn on_get_state(&mut self, partition: String, request_id: u64) -> Result<(), RuntimeError> {
        self.queue.enqueue_out_of_order(WorkItem::get_state(partition, request_id));
        self.arm_tick();
        self.drain_if_running()
    }

    fn on_tick(&mut self) -> Result<(), RuntimeError> {
        if !self.tick_pending {
            tracing::debug!("dropping unarmed tick");
            return Ok(());
        }
        self.tick_pending = false;
        self.drain_if_running()
    }

    fn drain_if_running(&mut self) -> Result<(), RuntimeError> {
        if !self.queue.is_running() || self.load_suspended {
            return Ok(());
        }
        while let Some(item) = self.queue.pop_next() {
            self.process_work_item(item)?;
            if self.load_suspended {
                break;
            }
        }
        self.refresh_throughput();
        self.statistics.queue_depth = self.queue.buffered_event_count();
        self.statistics.partitions_cached = self.cache.cached_item_count();
        self.publish(ProjectionEffect::StatisticsReport(self.statistics.clone()));
        Ok(())
    }

    /// Recomputes `events_per_second` over a rolling one-second window and
    /// rolls the window forward once it has elapsed.
    fn refresh_throughput(&mut self) {
        let now_ms = self.clock.epoch_ms();
        let elapsed_ms = now_ms.saturating_sub(self.stats_window_started_ms);
        if elapsed_ms == 0 {
            return;
        }
        let processed = self.statistics.events_processed.saturating_sub(self.stats_window_started_count);
        self.statistics.events_per_second = processed as f64 * 1000.0 / elapsed_ms as f64;
        if elapsed_ms >= 1_000 {
            self.stats_window_started_ms = now_ms;
            self.stats_window_started_count = self.statistics.events_processed;
        }
    }

    // ── Work item execution (§4.H) ───────────────────────────────────

    fn process_work_item(&mut self, item: WorkItem) -> Result<(), RuntimeError> {
        let tag = item.tag;
        match item.kind {
            WorkKind::Committed(event) => self.process_committed(tag, event),
            WorkKind::Progress(_) => self.finalize_event_processing(Vec::new(), tag, true),
            WorkKind::CheckpointSuggested => self.maybe_write_checkpoint(tag),
            WorkKind::GetState { partition, request_id } => self.process_get_state(partition, request_id),
        }
    }

    fn process_committed(&mut self, tag: CheckpointTag, event: CommittedEvent) -> Result<(), RuntimeError> {
        let key = self.partition_selector.select(&event);

        if key == ROOT_PARTITION {
            let state = self.cache.try_get_and_lock(&key, tag).map_err(|e| RuntimeError::Cache(e.to_string()))?;
            let state = state.unwrap_or_default();
            return self.continue_committed(key, tag, event, state);
        }

        match self.cache.try_get_and_lock(&key, tag).map_err(|e| RuntimeError::Cache(e.to_string()))? {
            Some(state) => self.continue_committed(key, tag, event, state),
            None => {
                self.begin_partition_load(key, tag, event);
                Ok(())
            }
        }
    }

    fn begin_partition_load(&mut self, partition: String, tag: CheckpointTag, event: CommittedEvent) {
        let stream = partition_stream(&self.name, &partition);
        let request_id = self.next_request_id();
        self.load_state_requests.insert(
            request_id,
            PendingPartitionLoad { partition: partition.clone(), tag, stream: stream.clone(), accumulated_exhausted_search: Vec::new() },
        );
        self.parked_items.insert(request_id, WorkItem::committed(tag, event));
        self.load_suspended = true;
        self.publish(ProjectionEffect::LoadPartitionRequested { partition, request_id, from: tag });
        self.executor.execute(RuntimeEffect::ReadBackwardPage {
            request_id,
            stream,
            from: tag,
            page_size: self.config.backward_page_size,
        });
    }

    fn handle_backward_page(
        &mut self,
        request_id: u64,
        result: Result<projection_core::BackwardPage, projection_core::ReadError>,
    ) -> Result<(), RuntimeError> {
        let Some(pending) = self.load_state_requests.remove(&request_id) else { return Ok(()) };
        let item = self.parked_items.remove(&request_id);
        let page = result?;

        let found = page.events.iter().find(|e| e.event_type == STATE_UPDATED_EVENT_TYPE);
        if let Some(found) = found {
            let state = found.data.clone();
            // The tag that produced this state lives in the event's own
            // metadata, not in the page-read request we issued — parse it
            // back rather than assuming it equals `pending.tag`, so a
            // mismatch between the two would actually surface instead of
            // being silently papered over.
            let recovered_tag = found
                .metadata
                .get(TAG_METADATA_KEY)
                .and_then(|json| parse_tag(json.as_bytes()).ok().flatten())
                .unwrap_or(pending.tag);
            self.cache
                .cache_and_lock(&pending.partition, state.clone(), Some(recovered_tag), None)
                .map_err(|e| RuntimeError::Cache(e.to_string()))?;
            return self.resume_after_load(pending.partition, recovered_tag, item, state);
        }

        if page.exhausted {
            self.cache
                .cache_and_lock(&pending.partition, Vec::new(), Some(pending.tag), None)
                .map_err(|e| RuntimeError::Cache(e.to_string()))?;
            return self.resume_after_load(pending.partition, pending.tag, item, Vec::new());
        }

        // Page exhausted its entries without finding `StateUpdated` or
        // reaching the start of the stream — walk one page further back.
        let next_from = page.events.last().map(|e| e.event_position).unwrap_or(pending.tag);
        let next_request_id = self.next_request_id();
        let stream = pending.stream.clone();
        self.load_state_requests.insert(next_request_id, pending);
        if let Some(item) = item {
            self.parked_items.insert(next_request_id, item);
        }
        self.executor.execute(RuntimeEffect::ReadBackwardPage {
            request_id: next_request_id,
            stream,
            from: next_from,
            page_size: self.config.backward_page_size,
        });
        Ok(())
    }

    /// A partition finished loading: process the parked item (if the
    /// resolved item was in fact the committed event we suspended for),
    /// lift the suspension, and keep draining whatever queued up while we
    /// waited.
    fn resume_after_load(
        &mut self,
        partition: String,
        tag: CheckpointTag,
        item: Option<WorkItem>,
        state: Vec<u8>,
    ) -> Result<(), RuntimeError> {
        self.load_suspended = false;
        if let Some(WorkItem { kind: WorkKind::Committed(event), .. }) = item {
            self.continue_committed(partition, tag, event, state)?;
        }
        self.drain_if_running()
    }

    fn continue_committed(
        &mut self,
        key: String,
        tag: CheckpointTag,
        event: CommittedEvent,
        state: Vec<u8>,
    ) -> Result<(), RuntimeError> {
        if self.loaded_partition.as_deref() != Some(key.as_str()) {
            self.loaded_partition = Some(key.clone());
        }

        let state_arg = if state.is_empty() { None } else { Some(state.as_slice()) };
        let ctx = EventContext { partition: key.clone(), tag, event: event.clone() };
        let output = self
            .handler
            .handle(state_arg, &ctx)
            .map_err(|source| RuntimeError::Handler { event_id: event.event_id.clone(), tag, source })?;

        if !output.emitted.is_empty() && !self.config.emit_event_enabled {
            return Err(RuntimeError::EmitNotAllowed);
        }

        let mut scheduled: Vec<EmittedEvent> = Vec::new();
        if output.processed {
            scheduled.extend(output.emitted);
        }

        if let Some(new_state) = output.state {
            if new_state != state {
                self.cache
                    .cache_and_lock(&key, new_state.clone(), Some(tag), None)
                    .map_err(|e| RuntimeError::Cache(e.to_string()))?;

                if self.config.publish_state_updates {
                    let mut metadata = HashMap::new();
                    metadata.insert(TAG_METADATA_KEY.to_string(), serde_json::to_string(&tag).expect("CheckpointTag always serializes"));
                    scheduled.push(EmittedEvent {
                        stream: partition_stream(&self.name, &key),
                        event_id: format!("state-{}-{}", tag.commit_position, tag.prepare_position),
                        event_type: STATE_UPDATED_EVENT_TYPE.to_string(),
                        data: new_state,
                        metadata,
                    });
                }
            }
        }

        self.finalize_event_processing(scheduled, tag, false)
    }

    fn finalize_event_processing(&mut self, emitted: Vec<EmittedEvent>, tag: CheckpointTag, is_progress: bool) -> Result<(), RuntimeError> {
        self.last_tag = tag;
        self.statistics.record_event();
        if is_progress {
            return Ok(());
        }
        if matches!(self.config.checkpoint_mode, projection_core::CheckpointMode::Every) {
            self.write_checkpoint(tag, emitted);
        } else if !emitted.is_empty() {
            self.write_checkpoint(tag, emitted);
        }
        Ok(())
    }

    fn maybe_write_checkpoint(&mut self, tag: CheckpointTag) -> Result<(), RuntimeError> {
        if self.config.checkpoints_enabled {
            self.write_checkpoint(tag, Vec::new());
        }
        Ok(())
    }

    fn write_checkpoint(&mut self, tag: CheckpointTag, emitted: Vec<EmittedEvent>) {
        let checkpoint = projection_core::Checkpoint { tag, version: self.config.version.clone() };
        self.last_tag = tag;
        self.statistics.last_checkpoint = Some(self.clock.epoch_ms().to_string());
        tracing::debug!(%tag, stream = %checkpoint_stream(&self.name), emitted = emitted.len(), "writing checkpoint");
        self.executor.execute(RuntimeEffect::WriteCheckpoint { checkpoint, emitted });
    }

    fn process_get_state(&mut self, partition: String, request_id: u64) -> Result<(), RuntimeError> {
        let state = self.cache.get_locked(&partition).ok().map(|s| s.to_vec());
        tracing::debug!(partition = %partition, request_id, served = state.is_some(), "get_state served from cache");
        Ok(())
    }

    // ── Checkpoint manager replies ───────────────────────────────────

    fn handle_checkpoint_loaded(
        &mut self,
        result: Result<Option<projection_core::Checkpoint>, projection_core::CheckpointError>,
    ) -> Result<(), RuntimeError> {
        self.state.ensure(&[LifecycleState::LoadStateRequested])?;
        let checkpoint = result.map_err(|e| RuntimeError::StateLoad(e.to_string()))?;
        let tag = checkpoint.map(|c| c.tag).unwrap_or_else(CheckpointTag::zero);
        self.last_tag = tag;
        self.enter_state_loaded_subscribed(tag);
        Ok(())
    }

    fn handle_checkpoint_written(
        &mut self,
        result: Result<(), projection_core::CheckpointError>,
        is_stop_flush: bool,
        tag: CheckpointTag,
    ) -> Result<(), RuntimeError> {
        if let Err(e) = result {
            if is_stop_flush {
                // Flush must always complete; log and proceed to the
                // terminal state anyway rather than getting stuck.
                tracing::error!(error = %e, "checkpoint flush failed; completing stop regardless");
            } else {
                return Err(RuntimeError::Checkpoint(e));
            }
        }

        self.cache.unlock(tag);

        // A completed checkpoint drives the lifecycle forward: it's the
        // unlock signal that ends a stop-flush (Stopping/FaultedStopping)
        // and the signal that a pause has finished draining (Paused). An
        // ordinary checkpoint write completing mid-`Running` changes
        // nothing but the unlocked cache above.
        match self.state {
            LifecycleState::Stopping => self.enter_stopped(),
            LifecycleState::FaultedStopping => self.enter_faulted(),
            LifecycleState::Paused => self.enter_resumed(),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
