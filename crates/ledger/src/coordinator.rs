//! The replicated ledger coordinator.

use sequitur_core::{CommittedBatch, Mempool, StateComputer};
use sequitur_types::{
    Command, Hash, StateVersion, VerifiedCommandsAndProof, VerifiedLedgerHeaderAndProof, Vertex,
    View,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Result of speculatively preparing a vertex.
///
/// Purely a computation over the vertex and its parent header; nothing
/// durable happens until the vertex commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedCommand {
    /// The state version committing this vertex would reach.
    pub state_version: StateVersion,

    /// Quorum timestamp the resulting header would carry.
    pub timestamp: u64,

    /// Whether committing this vertex would end the epoch.
    pub end_of_epoch: bool,
}

/// Outcome of a commit attempt.
///
/// The two non-applied outcomes are expected races, not defects: a stale
/// commit is simply dropped, and a gap means the caller is behind and
/// should initiate catch-up sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The commit advanced the ledger by one version.
    Applied,

    /// Duplicate or older than the current version; dropped.
    StaleIgnored,

    /// More than one version ahead; dropped, sync required.
    GapDetected,
}

impl CommitOutcome {
    /// Check if the commit was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied)
    }
}

/// Result of registering interest in a future state version.
#[derive(Debug)]
pub enum SyncStatus {
    /// The target version is already committed.
    Synced,

    /// Not there yet; the listener resolves when the version commits.
    Behind(CommitListener),
}

/// Handle resolving once the ledger reaches a registered version.
///
/// Dropping the listener cancels the registration: the ledger's send simply
/// finds no receiver. No timeout lives here; callers layer their own.
#[derive(Debug)]
pub struct CommitListener {
    rx: oneshot::Receiver<StateVersion>,
}

impl CommitListener {
    /// Wait for the registered version to commit.
    ///
    /// Returns None if the ledger shut down before reaching it.
    pub async fn wait(self) -> Option<StateVersion> {
        self.rx.await.ok()
    }

    /// Poll without blocking; Some once the version has committed.
    pub fn try_ready(&mut self) -> Option<StateVersion> {
        self.rx.try_recv().ok()
    }
}

/// State guarded by the coordinator's single lock.
struct LedgerState {
    last_proof: VerifiedLedgerHeaderAndProof,
    commit_waiters: BTreeMap<u64, Vec<oneshot::Sender<StateVersion>>>,
    subscribers: Vec<mpsc::UnboundedSender<CommittedBatch>>,
}

/// The single writer of committed ledger state.
///
/// `commit` is the only mutation path, regardless of whether the data
/// originated from local consensus or from catch-up sync. The lock exists
/// because sync responses and waiter registration arrive from other
/// contexts than the consensus event loop; it is held only for the duration
/// of one operation and never across I/O (the injected state computer is
/// required to be bounded and non-blocking).
pub struct ReplicatedLedger {
    state: Mutex<LedgerState>,
    mempool: Arc<dyn Mempool>,
    state_computer: Arc<dyn StateComputer>,
}

impl ReplicatedLedger {
    /// Create a ledger resuming from `initial_proof`.
    pub fn new(
        initial_proof: VerifiedLedgerHeaderAndProof,
        mempool: Arc<dyn Mempool>,
        state_computer: Arc<dyn StateComputer>,
    ) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                last_proof: initial_proof,
                commit_waiters: BTreeMap::new(),
                subscribers: Vec::new(),
            }),
            mempool,
            state_computer,
        }
    }

    /// Create a ledger starting from genesis.
    pub fn genesis(mempool: Arc<dyn Mempool>, state_computer: Arc<dyn StateComputer>) -> Self {
        Self::new(
            VerifiedLedgerHeaderAndProof::genesis(),
            mempool,
            state_computer,
        )
    }

    /// The latest committed version.
    pub fn current_version(&self) -> StateVersion {
        self.lock_state().last_proof.state_version()
    }

    /// The latest committed proof.
    pub fn last_proof(&self) -> VerifiedLedgerHeaderAndProof {
        self.lock_state().last_proof.clone()
    }

    /// Ask the mempool for the next command to propose.
    ///
    /// Pure delegation; `exclude` carries the hashes of commands already
    /// prepared on the proposing branch.
    pub fn generate_next_command(&self, _view: View, exclude: &HashSet<Hash>) -> Option<Command> {
        self.mempool.get_commands(1, exclude).into_iter().next()
    }

    /// Speculatively prepare a vertex.
    ///
    /// Non-destructive: may be called for many competing vertex branches
    /// concurrently. Touches no coordinator state, so branches never
    /// conflict.
    ///
    /// The version increment is 0 while the parent header ends an epoch
    /// (execution freezes until the epoch change completes), 1 when the
    /// vertex signals end-of-epoch or carries a command, and 0 otherwise.
    pub fn prepare(&self, vertex: &Vertex) -> PreparedCommand {
        let parent = vertex.parent_ledger_header();
        let timestamp = vertex.qc().timestamp();

        if parent.end_of_epoch {
            return PreparedCommand {
                state_version: parent.state_version,
                timestamp,
                end_of_epoch: true,
            };
        }

        let end_of_epoch = self.state_computer.prepare(vertex);
        let increment = u64::from(end_of_epoch || vertex.command().is_some());

        PreparedCommand {
            state_version: StateVersion(parent.state_version.0 + increment),
            timestamp,
            end_of_epoch,
        }
    }

    /// Register interest in `target` being committed.
    ///
    /// Returns [`SyncStatus::Synced`] immediately when the version is
    /// already durable; otherwise the returned listener resolves on the
    /// commit that reaches it. Cancellation is dropping the listener.
    pub fn await_commit(&self, target: StateVersion) -> SyncStatus {
        let mut state = self.lock_state();

        if target <= state.last_proof.state_version() {
            return SyncStatus::Synced;
        }

        let (tx, rx) = oneshot::channel();
        state.commit_waiters.entry(target.0).or_default().push(tx);
        debug!(target = target.0, "registered commit waiter");
        SyncStatus::Behind(CommitListener { rx })
    }

    /// Commit one command (or an epoch-boundary marker) at the proven
    /// version.
    ///
    /// The single mutation path. Commits are accepted only in strict
    /// `current + 1` order; anything else is dropped without error. An
    /// out-of-order commit is an expected race between consensus delivery
    /// and catch-up sync, not a defect.
    pub fn commit(
        &self,
        command: Option<Command>,
        proof: VerifiedLedgerHeaderAndProof,
    ) -> CommitOutcome {
        let mut state = self.lock_state();

        let current = state.last_proof.state_version();
        let target = proof.state_version();

        if target <= current {
            debug!(target = target.0, current = current.0, "stale commit ignored");
            return CommitOutcome::StaleIgnored;
        }
        if target.0 > current.0 + 1 {
            debug!(
                target = target.0,
                current = current.0,
                "commit gap detected, catch-up sync required"
            );
            return CommitOutcome::GapDetected;
        }

        let next_validator_set = self.state_computer.commit(command.as_ref(), &proof);

        if let Some(command) = &command {
            self.mempool.remove_committed(&command.hash());
        }

        state.last_proof = proof.clone();

        let commands: Vec<Command> = command.into_iter().collect();
        let commands_and_proof = VerifiedCommandsAndProof::new(commands, proof)
            .expect("a single-command batch at the next version is always contiguous");
        let batch = CommittedBatch {
            commands_and_proof,
            next_validator_set,
        };
        state.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());

        if let Some(waiters) = state.commit_waiters.remove(&target.0) {
            for waiter in waiters {
                let _ = waiter.send(target);
            }
        }

        info!(
            version = target.0,
            end_of_epoch = batch.next_validator_set.is_some(),
            "committed"
        );
        CommitOutcome::Applied
    }

    /// Subscribe to committed-batch notifications.
    ///
    /// Every applied commit is delivered to every live subscriber;
    /// disconnected subscribers are pruned on the next commit.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CommittedBatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_state().subscribers.push(tx);
        rx
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().expect("ledger lock poisoned")
    }
}
