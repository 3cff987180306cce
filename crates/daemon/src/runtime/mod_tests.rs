use super::*;
use projection_core::bus::test_support::RecordingBus;
use projection_core::test_support::committed_event;
use projection_core::{
    BackwardPage, Checkpoint, CheckpointError, CheckpointManager, EventContext, HandlerError, ProjectionEffect,
    ProjectionHandler, ProjectionHandlerOutput, ProjectionVersion, ReadError, RootOnlySelector,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A checkpoint manager whose `load`/`write` outcomes are scripted ahead of
/// time, so tests can drive the runtime's async-reply paths deterministically.
#[derive(Default)]
struct ScriptedCheckpointManager {
    loaded: Mutex<Option<Checkpoint>>,
    writes: Mutex<Vec<Checkpoint>>,
    emitted_writes: Mutex<Vec<Vec<projection_core::EmittedEvent>>>,
}

#[async_trait]
impl CheckpointManager for ScriptedCheckpointManager {
    async fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self.loaded.lock().clone())
    }

    async fn write(&self, checkpoint: &Checkpoint, emitted: &[projection_core::EmittedEvent]) -> Result<(), CheckpointError> {
        self.writes.lock().push(checkpoint.clone());
        self.emitted_writes.lock().push(emitted.to_vec());
        Ok(())
    }
}

/// A backward reader whose pages are pre-seeded per stream.
#[derive(Default)]
struct ScriptedReader {
    pages: Mutex<std::collections::HashMap<String, BackwardPage>>,
}

impl ScriptedReader {
    fn seed(&self, stream: &str, page: BackwardPage) {
        self.pages.lock().insert(stream.to_string(), page);
    }
}

#[async_trait]
impl projection_core::BackwardReader for ScriptedReader {
    async fn read_page(&self, stream: &str, _from: CheckpointTag, _page_size: u32) -> Result<BackwardPage, ReadError> {
        Ok(self.pages.lock().get(stream).cloned().unwrap_or_default())
    }
}

/// A handler that counts events folded into the root partition's state.
struct CountingHandler;

impl ProjectionHandler for CountingHandler {
    fn handle(&self, state: Option<&[u8]>, _ctx: &EventContext) -> Result<ProjectionHandlerOutput, HandlerError> {
        let count: u64 = state.and_then(|s| std::str::from_utf8(s).ok()).and_then(|s| s.parse().ok()).unwrap_or(0);
        Ok(ProjectionHandlerOutput::with_state((count + 1).to_string().into_bytes()))
    }
}

/// A handler that routes to a per-stream partition instead of root.
struct PartitionedHandler;

impl ProjectionHandler for PartitionedHandler {
    fn handle(&self, state: Option<&[u8]>, _ctx: &EventContext) -> Result<ProjectionHandlerOutput, HandlerError> {
        let mut s = state.map(|s| s.to_vec()).unwrap_or_default();
        s.push(b'x');
        Ok(ProjectionHandlerOutput::with_state(s))
    }
}

struct ByStreamSelector;

impl projection_core::PartitionSelector for ByStreamSelector {
    fn select(&self, event: &CommittedEvent) -> String {
        event.stream_id.clone()
    }
}

fn test_executor(bus: Arc<RecordingBus>, checkpoints: Arc<ScriptedCheckpointManager>, reader: Arc<ScriptedReader>) -> (Executor, mpsc::Receiver<RuntimeMessage>) {
    let (tx, rx) = mpsc::channel(64);
    (Executor::new(checkpoints, reader, bus, tx), rx)
}

async fn drain_one(rx: &mut mpsc::Receiver<RuntimeMessage>) -> RuntimeMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn cold_start_loads_checkpoint_subscribes_and_runs() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints, reader);

    let mut runtime = Runtime::new(
        "orders",
        CountingHandler,
        Arc::new(RootOnlySelector),
        ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1)),
        executor,
    );

    runtime.start();
    assert_eq!(runtime.state(), LifecycleState::LoadStateRequested);

    let msg = drain_one(&mut rx).await;
    runtime.handle_message(msg);

    assert_eq!(runtime.state(), LifecycleState::Running);
    let published = bus.published();
    assert!(published.contains(&ProjectionEffect::Started));
    assert!(published.iter().any(|e| matches!(e, ProjectionEffect::SubscribeProjection { from } if from.is_zero())));
}

#[tokio::test]
async fn one_event_is_folded_and_triggers_a_checkpoint_write() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let mut config = ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1));
    config.checkpoint_mode = projection_core::CheckpointMode::Every;
    let mut runtime =
        Runtime::new("orders", CountingHandler, Arc::new(RootOnlySelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);
    assert_eq!(runtime.state(), LifecycleState::Running);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "orders-1", "OrderPlaced");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));

    let write_msg = drain_one(&mut rx).await;
    runtime.handle_message(write_msg);

    assert_eq!(checkpoints.writes.lock().last().unwrap().tag, tag);
    assert_eq!(runtime.statistics().events_processed, 1);

    // The folded state change schedules a `StateUpdated` emission, and it
    // must actually reach the checkpoint manager rather than being dropped.
    let emitted = checkpoints.emitted_writes.lock().last().unwrap().clone();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].event_type, "StateUpdated");
    assert_eq!(emitted[0].stream, "$projections-orders-state");
    let recovered_tag = projection_core::parse_tag(emitted[0].metadata[projection_core::TAG_METADATA_KEY].as_bytes())
        .unwrap()
        .unwrap();
    assert_eq!(recovered_tag, tag);
}

#[tokio::test]
async fn checkpoint_completion_while_paused_auto_resumes_to_running() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let mut config = ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1));
    config.checkpoint_mode = projection_core::CheckpointMode::Every;
    let mut runtime = Runtime::new("orders", CountingHandler, Arc::new(RootOnlySelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);
    assert_eq!(runtime.state(), LifecycleState::Running);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "orders-1", "OrderPlaced");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));

    // The checkpoint write for that event is still in flight when the admin
    // pauses the projection.
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::PauseRequested));
    assert_eq!(runtime.state(), LifecycleState::Paused);

    // The in-flight write completes while paused; it must drive the
    // lifecycle straight back to `Running` rather than leaving it stuck.
    let write_msg = drain_one(&mut rx).await;
    runtime.handle_message(write_msg);
    assert_eq!(runtime.state(), LifecycleState::Running);
}

#[tokio::test]
async fn partition_recovery_suspends_and_resumes_the_queue() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    reader.seed("$projections-shipping-ship-1-state", BackwardPage { events: Vec::new(), exhausted: true });
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let config = ProjectionConfig::new(ProjectionVersion::new("shipping", 0, 1));
    let mut runtime =
        Runtime::new("shipping", PartitionedHandler, Arc::new(ByStreamSelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);
    assert_eq!(runtime.state(), LifecycleState::Running);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "ship-1", "ShipmentCreated");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));

    assert!(runtime.load_suspended);
    let page_reply = drain_one(&mut rx).await;
    runtime.handle_message(page_reply);
    assert!(!runtime.load_suspended);

    let write_msg = drain_one(&mut rx).await;
    runtime.handle_message(write_msg);
    assert_eq!(runtime.statistics().events_processed, 1);
}

#[tokio::test]
async fn recovered_partition_lock_uses_the_tag_parsed_from_metadata_not_the_request_tag() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());

    let recovered_tag = CheckpointTag::new(10, 0);
    let mut metadata = std::collections::HashMap::new();
    metadata.insert(
        projection_core::TAG_METADATA_KEY.to_string(),
        serde_json::to_string(&recovered_tag).unwrap(),
    );
    let found_event = CommittedEvent {
        event_position: CheckpointTag::new(9, 0),
        stream_id: "ship-1".to_string(),
        event_type: "StateUpdated".to_string(),
        category: "ship".to_string(),
        event_id: "state-10-0".to_string(),
        sequence_number: 9,
        metadata,
        data: b"xx".to_vec(),
    };
    reader.seed(
        "$projections-shipping-ship-1-state",
        BackwardPage { events: vec![found_event], exhausted: false },
    );
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let config = ProjectionConfig::new(ProjectionVersion::new("shipping", 0, 1));
    let mut runtime =
        Runtime::new("shipping", PartitionedHandler, Arc::new(ByStreamSelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "ship-1", "ShipmentCreated");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));
    assert!(runtime.load_suspended);

    let page_reply = drain_one(&mut rx).await;
    runtime.handle_message(page_reply);
    assert!(!runtime.load_suspended);

    // Had the cache locked at the requested tag (1,0) instead of the one
    // recovered from the found event's metadata (10,0), this unlock for an
    // intermediate tag would have purged the partition.
    runtime.cache.unlock(CheckpointTag::new(5, 0));
    assert!(runtime.cache.contains("ship-1"));
}

#[tokio::test]
async fn emit_forbidden_by_config_faults_the_projection() {
    struct EmittingHandler;
    impl ProjectionHandler for EmittingHandler {
        fn handle(&self, _state: Option<&[u8]>, _ctx: &EventContext) -> Result<ProjectionHandlerOutput, HandlerError> {
            Ok(ProjectionHandlerOutput::with_state(b"x".to_vec())
                .with_emitted(vec![projection_core::EmittedEvent::new("derived", "e1", "Derived", vec![])]))
        }
    }

    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let mut config = ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1));
    config.emit_event_enabled = false;
    let mut runtime = Runtime::new("orders", EmittingHandler, Arc::new(RootOnlySelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "orders-1", "OrderPlaced");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));

    // The fault path publishes UnsubscribeProjection then flushes a
    // checkpoint before reaching `Faulted`.
    assert_eq!(runtime.state(), LifecycleState::FaultedStopping);
    let flush_msg = drain_one(&mut rx).await;
    runtime.handle_message(flush_msg);
    assert_eq!(runtime.state(), LifecycleState::Faulted);
    assert!(runtime.fault_reason().is_some());
    assert!(bus.published().iter().any(|e| matches!(e, ProjectionEffect::Faulted { .. })));
}

#[tokio::test]
async fn stale_subscription_messages_are_discarded() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints, reader);

    let mut runtime = Runtime::new(
        "orders",
        CountingHandler,
        Arc::new(RootOnlySelector),
        ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1)),
        executor,
    );
    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "orders-1", "OrderPlaced");
    // seq 5 instead of the expected 0 — armed guard discards it outright.
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 5, event }));

    assert_eq!(runtime.statistics().events_processed, 0);
    assert_eq!(runtime.state(), LifecycleState::Running);
}

#[tokio::test]
async fn stop_requested_while_paused_still_flushes_and_stops() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let mut runtime = Runtime::new(
        "orders",
        CountingHandler,
        Arc::new(RootOnlySelector),
        ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1)),
        executor,
    );
    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::PauseRequested));
    assert_eq!(runtime.state(), LifecycleState::Paused);

    runtime.request_stop();
    assert_eq!(runtime.state(), LifecycleState::Stopping);

    let flush_msg = drain_one(&mut rx).await;
    runtime.handle_message(flush_msg);
    assert_eq!(runtime.state(), LifecycleState::Stopped);
    assert!(bus.published().contains(&ProjectionEffect::Stopped));
}

#[tokio::test]
async fn events_per_second_tracks_a_fake_clock_without_sleeping() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints, reader);

    let clock = projection_core::FakeClock::new();
    let mut runtime = Runtime::with_clock(
        "orders",
        CountingHandler,
        Arc::new(RootOnlySelector),
        ProjectionConfig::new(ProjectionVersion::new("orders", 0, 1)),
        executor,
        clock.clone(),
    );

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "orders-1", "OrderPlaced");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));

    clock.advance(Duration::from_millis(500));

    let tag2 = CheckpointTag::new(2, 0);
    let event2 = committed_event(tag2, "orders-1", "OrderPlaced");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 1, event: event2 }));

    assert_eq!(runtime.statistics().events_processed, 2);
    assert!(runtime.statistics().events_per_second > 0.0);
}

#[tokio::test]
async fn restart_discards_a_stale_backward_read_reply() {
    let bus = Arc::new(RecordingBus::new());
    let checkpoints = Arc::new(ScriptedCheckpointManager::default());
    let reader = Arc::new(ScriptedReader::default());
    let (executor, mut rx) = test_executor(bus.clone(), checkpoints.clone(), reader);

    let config = ProjectionConfig::new(ProjectionVersion::new("shipping", 0, 1));
    let mut runtime =
        Runtime::new("shipping", PartitionedHandler, Arc::new(ByStreamSelector), config, executor);

    runtime.start();
    runtime.handle_message(drain_one(&mut rx).await);

    let tag = CheckpointTag::new(1, 0);
    let event = committed_event(tag, "ship-1", "ShipmentCreated");
    runtime.handle_message(RuntimeMessage::Bus(ProjectionEvent::CommittedEventReceived { seq: 0, event }));
    assert!(runtime.load_suspended);

    // The backward-page request is still outstanding; restart tears down
    // the in-flight load before its reply ever arrives.
    runtime.restart();
    assert!(!runtime.load_state_requests.contains_key(&0));
    assert!(!runtime.parked_items.contains_key(&0));

    // The stale reply arrives anyway (the in-flight future already ran);
    // it must be a no-op against the post-restart runtime.
    let stale_reply = RuntimeMessage::BackwardPageRead {
        request_id: 0,
        result: Ok(BackwardPage { events: Vec::new(), exhausted: true }),
    };
    runtime.handle_message(stale_reply);

    assert!(!runtime.cache.contains("ship-1"));
    assert_eq!(runtime.statistics().events_processed, 0);
}
