//! Consensus protocol messages: proposals, votes and view timeouts.

use crate::NetworkMessage;
use sbor::prelude::BasicSbor;
use sequitur_types::{
    ledger_proof_message, Epoch, Signature, ValidatorId, Vertex, View, VoteData,
};

/// A leader's proposal of the next vertex.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Proposal {
    /// The proposed vertex.
    pub vertex: Vertex,

    /// Proposing validator.
    pub author: ValidatorId,

    /// Author's signature over the vertex id.
    pub signature: Signature,
}

impl Proposal {
    /// Create a new proposal.
    pub fn new(vertex: Vertex, author: ValidatorId, signature: Signature) -> Self {
        Self {
            vertex,
            author,
            signature,
        }
    }
}

impl NetworkMessage for Proposal {
    fn message_type_id() -> &'static str {
        "consensus.proposal"
    }
}

/// A validator's vote on a proposed vertex.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Vote {
    /// What is being voted on.
    pub vote_data: VoteData,

    /// Voting validator.
    pub author: ValidatorId,

    /// Author's wall-clock timestamp (milliseconds).
    pub timestamp: u64,

    /// Signature over [`Vote::signing_message`].
    pub signature: Signature,
}

impl Vote {
    /// Create a new vote.
    pub fn new(
        vote_data: VoteData,
        author: ValidatorId,
        timestamp: u64,
        signature: Signature,
    ) -> Self {
        Self {
            vote_data,
            author,
            timestamp,
            signature,
        }
    }

    /// The canonical message bytes this vote signs: the proposed ledger
    /// header under the ledger-proof domain tag.
    ///
    /// Votes aggregated into a quorum certificate therefore double as the
    /// ledger proof signatures checked during catch-up sync.
    pub fn signing_message(&self) -> Vec<u8> {
        ledger_proof_message(
            &self.vote_data.proposed.ledger_header.hash(),
            self.timestamp,
        )
    }
}

impl NetworkMessage for Vote {
    fn message_type_id() -> &'static str {
        "consensus.vote"
    }
}

/// A validator's signal that a view timed out without progress.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct ViewTimeoutMessage {
    /// Epoch the timeout belongs to.
    pub epoch: Epoch,

    /// The timed-out view.
    pub view: View,

    /// Signaling validator.
    pub author: ValidatorId,

    /// Author's signature.
    pub signature: Signature,
}

impl ViewTimeoutMessage {
    /// Create a new view timeout message.
    pub fn new(epoch: Epoch, view: View, author: ValidatorId, signature: Signature) -> Self {
        Self {
            epoch,
            view,
            author,
            signature,
        }
    }
}

impl NetworkMessage for ViewTimeoutMessage {
    fn message_type_id() -> &'static str {
        "consensus.view_timeout"
    }
}
