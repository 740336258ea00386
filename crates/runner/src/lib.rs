//! Single-threaded consensus event loop.
//!
//! All consensus-and-ledger-affecting callbacks must execute on one logical
//! thread, in arrival order, so that nothing downstream of the loop needs
//! locking against the BFT processor. [`ConsensusRunner`] owns that thread
//! of execution: producers push [`ConsensusEvent`]s into a fan-in channel
//! through cloned [`EventDispatcher`]s, and a single consumer task pops and
//! dispatches them one at a time.
//!
//! # Lifecycle
//!
//! `Stopped → Running → Stopped` transitions are idempotent; events arriving
//! while stopped stay queued. `shutdown` is terminal. A handler error is
//! fatal: it is logged, surfaced as a [`FatalLoopError`] to the supervisor,
//! and the loop transitions straight to `Shutdown`. Continuing to process
//! events after an unexplained handler failure could violate the
//! single-writer invariant every downstream component relies on.

use sequitur_core::{BftEventProcessor, ConsensusEvent, ProcessorError, VertexSyncProcessor};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle state of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not consuming events; arriving events are queued.
    Stopped,

    /// Consuming and dispatching events.
    Running,

    /// Terminal: the worker task has been released.
    Shutdown,
}

/// A handler error that tore the loop down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fatal error handling {event}: {source}")]
pub struct FatalLoopError {
    /// Name of the event kind whose handler failed.
    pub event: &'static str,

    /// The underlying handler error.
    #[source]
    pub source: ProcessorError,
}

/// Cloneable producer handle feeding the loop.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: mpsc::UnboundedSender<ConsensusEvent>,
}

impl EventDispatcher {
    /// Enqueue an event.
    ///
    /// Never blocks. Events dispatched after shutdown are dropped.
    pub fn dispatch(&self, event: ConsensusEvent) {
        if self.tx.send(event).is_err() {
            warn!("consensus event dropped: loop has shut down");
        }
    }
}

/// The consensus event loop.
///
/// Construct with the BFT processor and the vertex-sync logic, then hand
/// [`EventDispatcher`]s to every input source (pacemaker, network ingress,
/// ledger notifications). Must be created within a tokio runtime.
pub struct ConsensusRunner {
    name: String,
    control: Arc<watch::Sender<RunState>>,
    events: mpsc::UnboundedSender<ConsensusEvent>,
    fatal_rx: Mutex<Option<mpsc::UnboundedReceiver<FatalLoopError>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConsensusRunner {
    /// Create the loop in the `Stopped` state.
    pub fn new(
        name: impl Into<String>,
        bft: impl BftEventProcessor + 'static,
        vertex_sync: impl VertexSyncProcessor + 'static,
    ) -> Self {
        let name = name.into();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        let control = Arc::new(watch::channel(RunState::Stopped).0);

        // The worker only holds a weak reference to the control channel so
        // that dropping the runner releases the task.
        let worker = tokio::spawn(run_loop(
            name.clone(),
            Arc::downgrade(&control),
            control.subscribe(),
            event_rx,
            fatal_tx,
            bft,
            vertex_sync,
        ));

        Self {
            name,
            control,
            events: event_tx,
            fatal_rx: Mutex::new(Some(fatal_rx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Get a producer handle.
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher {
            tx: self.events.clone(),
        }
    }

    /// Take the supervisor's fatal-error channel. Yields `None` after the
    /// first call.
    pub fn take_fatal_errors(&self) -> Option<mpsc::UnboundedReceiver<FatalLoopError>> {
        self.fatal_rx.lock().expect("runner lock poisoned").take()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.control.borrow()
    }

    /// Begin consuming events. No-op unless currently `Stopped`.
    pub fn start(&self) {
        let started = self.control.send_if_modified(|state| {
            if *state == RunState::Stopped {
                *state = RunState::Running;
                true
            } else {
                false
            }
        });
        if started {
            info!(runner = %self.name, "starting consensus event loop");
        }
    }

    /// Pause consumption, retaining queued events. No-op unless `Running`.
    ///
    /// An in-flight handler finishes before the pause takes effect.
    pub fn stop(&self) {
        let stopped = self.control.send_if_modified(|state| {
            if *state == RunState::Running {
                *state = RunState::Stopped;
                true
            } else {
                false
            }
        });
        if stopped {
            info!(runner = %self.name, "stopping consensus event loop");
        }
    }

    /// Terminally shut down and release the worker task.
    pub async fn shutdown(&self) {
        self.control.send_if_modified(|state| {
            if *state == RunState::Shutdown {
                false
            } else {
                *state = RunState::Shutdown;
                true
            }
        });

        let worker = self.worker.lock().expect("runner lock poisoned").take();
        if let Some(worker) = worker {
            if worker.await.is_err() {
                error!(runner = %self.name, "consensus event loop worker panicked");
            }
        }
    }
}

async fn run_loop(
    name: String,
    control: std::sync::Weak<watch::Sender<RunState>>,
    mut control_rx: watch::Receiver<RunState>,
    mut events: mpsc::UnboundedReceiver<ConsensusEvent>,
    fatal_tx: mpsc::UnboundedSender<FatalLoopError>,
    mut bft: impl BftEventProcessor,
    mut vertex_sync: impl VertexSyncProcessor,
) {
    loop {
        let state = *control_rx.borrow_and_update();
        match state {
            RunState::Shutdown => break,
            RunState::Stopped => {
                // Runner dropped without shutdown: release the task.
                if control_rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
            RunState::Running => {}
        }

        tokio::select! {
            // Control transitions win over queued events, so a stop takes
            // effect before the next dispatch.
            biased;

            changed = control_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    // Every dispatcher dropped; nothing can arrive anymore.
                    break;
                };
                let event_name = event.type_name();
                debug!(runner = %name, event = event_name, "dispatching");
                if let Err(source) = dispatch(&mut bft, &mut vertex_sync, event) {
                    error!(
                        runner = %name,
                        event = event_name,
                        error = %source,
                        "fatal error in consensus event loop, shutting down"
                    );
                    let _ = fatal_tx.send(FatalLoopError {
                        event: event_name,
                        source,
                    });
                    if let Some(control) = control.upgrade() {
                        let _ = control.send(RunState::Shutdown);
                    }
                    break;
                }
            }
        }
    }

    info!(runner = %name, "consensus event loop terminated");
}

/// Route one event to its handler.
///
/// Exhaustive over [`ConsensusEvent`]; BFT updates fan out to both the BFT
/// processor and the vertex-sync logic.
fn dispatch(
    bft: &mut impl BftEventProcessor,
    vertex_sync: &mut impl VertexSyncProcessor,
    event: ConsensusEvent,
) -> Result<(), ProcessorError> {
    match event {
        ConsensusEvent::Timeout(timeout) => bft.on_timeout(timeout),
        ConsensusEvent::Proposal(proposal) => bft.on_proposal(proposal),
        ConsensusEvent::Vote(vote) => bft.on_vote(vote),
        ConsensusEvent::ViewTimeout(timeout) => bft.on_view_timeout(timeout),
        ConsensusEvent::VertexSyncRequest(request) => vertex_sync.on_sync_request(request),
        ConsensusEvent::VertexSyncResponse(response) => vertex_sync.on_sync_response(response),
        ConsensusEvent::VertexSyncError(response) => vertex_sync.on_sync_error(response),
        ConsensusEvent::BftUpdate(update) => {
            bft.on_bft_update(update.clone())?;
            vertex_sync.on_bft_update(update)
        }
        ConsensusEvent::LedgerUpdate(update) => bft.on_ledger_update(update),
    }
}
