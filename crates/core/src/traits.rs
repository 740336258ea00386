//! Capability and processor traits.
//!
//! The ledger consumes [`Mempool`], [`StateComputer`] and [`Hasher`] from
//! subsystems outside this workspace; the event loop drives
//! [`BftEventProcessor`] and [`VertexSyncProcessor`] implementations.

use crate::{BftUpdate, LedgerUpdate, ProcessorError, ScheduledTimeout};
use sequitur_messages::{
    GetVerticesErrorResponse, GetVerticesRequest, GetVerticesResponse, Proposal, ViewTimeoutMessage,
    Vote,
};
use sequitur_types::{Command, Hash, ValidatorSet, VerifiedLedgerHeaderAndProof, Vertex};
use std::collections::HashSet;

/// Pool of client commands awaiting inclusion.
pub trait Mempool: Send + Sync {
    /// Get up to `limit` ready commands, skipping any whose hash is in
    /// `exclude` (commands already prepared on a speculative branch).
    fn get_commands(&self, limit: usize, exclude: &HashSet<Hash>) -> Vec<Command>;

    /// Drop a committed command from the pool.
    fn remove_committed(&self, command_hash: &Hash);
}

/// The pluggable deterministic application logic.
///
/// Both methods must be bounded and non-blocking: `commit` runs under the
/// ledger's lock, and persistence beyond this boundary is expected to be
/// buffered or asynchronous.
pub trait StateComputer: Send + Sync {
    /// Speculatively probe a vertex; returns true if executing it would end
    /// the current epoch.
    fn prepare(&self, vertex: &Vertex) -> bool;

    /// Durably apply a committed command.
    ///
    /// Returns the next epoch's validator set exactly when this commit ends
    /// the epoch.
    fn commit(
        &self,
        command: Option<&Command>,
        proof: &VerifiedLedgerHeaderAndProof,
    ) -> Option<ValidatorSet>;
}

/// Content hashing capability.
pub trait Hasher: Send + Sync {
    /// Hash arbitrary bytes.
    fn hash(&self, bytes: &[u8]) -> Hash;
}

/// Default hasher, matching [`Hash::from_bytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash(&self, bytes: &[u8]) -> Hash {
        Hash::from_bytes(bytes)
    }
}

/// The BFT protocol processor driven by the event loop.
///
/// Handlers run on the loop's single worker context and therefore never
/// race each other. A returned error is fatal: the loop tears itself down
/// instead of continuing with a possibly violated single-writer invariant.
pub trait BftEventProcessor: Send {
    /// Handle a local pacemaker timeout.
    fn on_timeout(&mut self, timeout: ScheduledTimeout) -> Result<(), ProcessorError>;

    /// Handle an inbound proposal.
    fn on_proposal(&mut self, proposal: Proposal) -> Result<(), ProcessorError>;

    /// Handle an inbound vote.
    fn on_vote(&mut self, vote: Vote) -> Result<(), ProcessorError>;

    /// Handle an inbound view timeout signal.
    fn on_view_timeout(&mut self, timeout: ViewTimeoutMessage) -> Result<(), ProcessorError>;

    /// Handle a locally produced BFT update.
    fn on_bft_update(&mut self, update: BftUpdate) -> Result<(), ProcessorError>;

    /// Handle a ledger committed-batch notification.
    fn on_ledger_update(&mut self, update: LedgerUpdate) -> Result<(), ProcessorError>;
}

/// The vertex-sync logic driven by the event loop.
///
/// Receives the sync RPC traffic plus every BFT update (an inserted vertex
/// may satisfy a pending sync).
pub trait VertexSyncProcessor: Send {
    /// Handle an inbound vertex request.
    fn on_sync_request(&mut self, request: GetVerticesRequest) -> Result<(), ProcessorError>;

    /// Handle an inbound vertex response.
    fn on_sync_response(&mut self, response: GetVerticesResponse) -> Result<(), ProcessorError>;

    /// Handle an inbound vertex error response.
    fn on_sync_error(&mut self, error: GetVerticesErrorResponse) -> Result<(), ProcessorError>;

    /// Observe a locally produced BFT update.
    fn on_bft_update(&mut self, update: BftUpdate) -> Result<(), ProcessorError>;
}
