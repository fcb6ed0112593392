//! Theme-apply worker actor.
//!
//! A single tokio task drains an unbounded FIFO of [`ThemeRequest`]s. Each
//! request's blocking work runs on the blocking pool and is awaited before the
//! next request is dequeued, so at most one request ever touches the theme
//! state. Progress is reported on an event stream and through a `watch`
//! channel holding the current [`WorkerState`].

use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::error::WorkerStopped;

mod schema;
mod steps;

pub use schema::*;
pub use steps::{handle_request, RequestReport, StepFailure, ThemeContext};

/// Event stream receiver returned by [`spawn_worker`].
pub type WorkerEventStream = mpsc::UnboundedReceiver<WorkerEventEnvelope>;

struct QueuedRequest {
    id: RequestId,
    request: ThemeRequest,
}

/// Enqueue side of a spawned worker. Cheap to clone; the worker stops once
/// every clone is dropped and the queue has drained.
#[derive(Clone)]
pub struct ThemeWorkerHandle {
    requests: mpsc::UnboundedSender<QueuedRequest>,
    // Held across id assignment and send so ids follow queue order.
    next_id: Arc<Mutex<RequestId>>,
    state: watch::Receiver<WorkerState>,
}

impl ThemeWorkerHandle {
    /// Enqueue one request. Never blocks.
    pub fn submit(&self, request: ThemeRequest) -> Result<RequestId, WorkerStopped> {
        let mut next_id = self
            .next_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = *next_id;
        self.requests
            .send(QueuedRequest { id, request })
            .map_err(|_| WorkerStopped)?;
        *next_id += 1;
        Ok(id)
    }

    /// Snapshot of what the worker is doing.
    pub fn state(&self) -> WorkerState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state.clone()
    }
}

/// Spawn the worker task. Must be called inside a tokio runtime.
pub fn spawn_worker(ctx: ThemeContext) -> (ThemeWorkerHandle, WorkerEventStream) {
    let ctx = Arc::new(ctx);
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<QueuedRequest>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WorkerEventEnvelope>();
    let (state_tx, state_rx) = watch::channel(WorkerState::Idle);

    tokio::spawn(async move {
        let mut seq: u64 = 0;
        emit_event(&event_tx, &mut seq, WorkerEvent::Lifecycle(LifecycleEvent::Started));
        info!("theme worker started");

        while let Some(queued) = request_rx.recv().await {
            run_request(&ctx, queued, &state_tx, &event_tx, &mut seq).await;
        }

        info!("theme worker stopped");
        emit_event(&event_tx, &mut seq, WorkerEvent::Lifecycle(LifecycleEvent::Stopped));
    });

    (
        ThemeWorkerHandle {
            requests: request_tx,
            next_id: Arc::new(Mutex::new(1)),
            state: state_rx,
        },
        event_rx,
    )
}

async fn run_request(
    ctx: &Arc<ThemeContext>,
    queued: QueuedRequest,
    state_tx: &watch::Sender<WorkerState>,
    event_tx: &mpsc::UnboundedSender<WorkerEventEnvelope>,
    seq: &mut u64,
) {
    let QueuedRequest { id, request } = queued;
    info!(request_id = id, %request, "processing theme request");
    state_tx.send_replace(WorkerState::Processing {
        request_id: id,
        request: request.clone(),
    });
    emit_event(
        event_tx,
        seq,
        WorkerEvent::RequestStarted {
            request_id: id,
            request: request.clone(),
        },
    );

    let task_ctx = Arc::clone(ctx);
    let outcome = tokio::task::spawn_blocking(move || handle_request(&task_ctx, &request)).await;
    let failures = match outcome {
        Ok(report) => {
            for failure in &report.failures {
                emit_event(
                    event_tx,
                    seq,
                    WorkerEvent::StepFailed {
                        request_id: id,
                        step: failure.step.to_string(),
                        kind: failure.error.kind(),
                        message: failure.error.to_string(),
                    },
                );
            }
            report.failures.len()
        }
        Err(err) => {
            error!(request_id = id, error = %err, "theme request aborted");
            1
        }
    };

    state_tx.send_replace(WorkerState::Idle);
    info!(request_id = id, failures, "theme request finished");
    emit_event(
        event_tx,
        seq,
        WorkerEvent::RequestFinished {
            request_id: id,
            failures,
        },
    );
}

fn emit_event(tx: &mpsc::UnboundedSender<WorkerEventEnvelope>, seq: &mut u64, event: WorkerEvent) {
    let _ = tx.send(WorkerEventEnvelope::new(*seq, event));
    *seq = seq.saturating_add(1);
}
