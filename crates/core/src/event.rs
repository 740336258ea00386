//! Events merged by the consensus event loop.

use sequitur_messages::{
    GetVerticesErrorResponse, GetVerticesRequest, GetVerticesResponse, Proposal, ViewTimeoutMessage,
    Vote,
};
use sequitur_types::{Epoch, ValidatorSet, VerifiedCommandsAndProof, Vertex, View};

/// A locally scheduled pacemaker timeout firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTimeout {
    /// Epoch the timeout was armed in.
    pub epoch: Epoch,

    /// View the timeout was armed for.
    pub view: View,
}

/// A locally produced BFT update: a vertex was inserted into the vertex
/// store.
///
/// Forwarded to both the BFT processor and the vertex-sync tracking logic,
/// which may have requests pending on the inserted vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BftUpdate {
    /// The inserted vertex.
    pub inserted: Vertex,
}

/// Notification that commands were durably committed to the ledger.
///
/// Emitted once per applied commit; `next_validator_set` is present exactly
/// when the commit ended the epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBatch {
    /// The committed commands and their proof.
    pub commands_and_proof: VerifiedCommandsAndProof,

    /// Next epoch's validator set, on end-of-epoch commits only.
    pub next_validator_set: Option<ValidatorSet>,
}

/// A committed-batch notification re-entering the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    /// The committed batch.
    pub batch: CommittedBatch,
}

/// The closed set of inputs to the consensus event loop.
///
/// Making this an enum (rather than dispatching on runtime message tags)
/// makes an unrecognized input unrepresentable; the loop matches
/// exhaustively.
#[derive(Debug, Clone)]
pub enum ConsensusEvent {
    /// Local pacemaker timeout.
    Timeout(ScheduledTimeout),

    /// Inbound proposal.
    Proposal(Proposal),

    /// Inbound vote.
    Vote(Vote),

    /// Inbound view timeout signal.
    ViewTimeout(ViewTimeoutMessage),

    /// Inbound vertex-sync request.
    VertexSyncRequest(GetVerticesRequest),

    /// Inbound vertex-sync response.
    VertexSyncResponse(GetVerticesResponse),

    /// Inbound vertex-sync error response.
    VertexSyncError(GetVerticesErrorResponse),

    /// Locally produced BFT update.
    BftUpdate(BftUpdate),

    /// Ledger committed-batch notification.
    LedgerUpdate(LedgerUpdate),
}

impl ConsensusEvent {
    /// Get a human-readable name for this event kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConsensusEvent::Timeout(_) => "Timeout",
            ConsensusEvent::Proposal(_) => "Proposal",
            ConsensusEvent::Vote(_) => "Vote",
            ConsensusEvent::ViewTimeout(_) => "ViewTimeout",
            ConsensusEvent::VertexSyncRequest(_) => "VertexSyncRequest",
            ConsensusEvent::VertexSyncResponse(_) => "VertexSyncResponse",
            ConsensusEvent::VertexSyncError(_) => "VertexSyncError",
            ConsensusEvent::BftUpdate(_) => "BftUpdate",
            ConsensusEvent::LedgerUpdate(_) => "LedgerUpdate",
        }
    }

    /// Check if this is an inbound consensus protocol message.
    pub fn is_consensus_message(&self) -> bool {
        matches!(
            self,
            ConsensusEvent::Proposal(_) | ConsensusEvent::Vote(_) | ConsensusEvent::ViewTimeout(_)
        )
    }

    /// Check if this is a vertex-sync RPC event.
    pub fn is_vertex_sync(&self) -> bool {
        matches!(
            self,
            ConsensusEvent::VertexSyncRequest(_)
                | ConsensusEvent::VertexSyncResponse(_)
                | ConsensusEvent::VertexSyncError(_)
        )
    }
}
