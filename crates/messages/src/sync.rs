//! Ledger catch-up sync DTOs.
//!
//! These are the untrusted wire forms of ledger proofs and command batches.
//! They become trusted only after the sync verifier checks the hash chain
//! and the signature quorum.

use crate::NetworkMessage;
use sbor::prelude::BasicSbor;
use sequitur_types::{BftHeader, Command, Hash, LedgerHeader, TimestampedSignatures, VoteData};

/// Unverified ledger header and proof as received from a peer.
///
/// Besides the committed header and its signatures this carries the BFT
/// ancestry headers (parent and proposed vertex references) needed to
/// reconstruct the vote data the signatures were formed over.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct DtoLedgerHeaderAndProof {
    /// Parent vertex header from the certifying vote data.
    pub parent: BftHeader,

    /// Proposed vertex header from the certifying vote data.
    pub proposed: BftHeader,

    /// The committed ledger header being proven.
    pub committed: LedgerHeader,

    /// Claimed quorum signatures over the committed header.
    pub signatures: TimestampedSignatures,
}

impl DtoLedgerHeaderAndProof {
    /// Reconstruct the vote data object the signatures cover.
    pub fn vote_data(&self) -> VoteData {
        VoteData {
            proposed: self.proposed.clone(),
            parent: self.parent.clone(),
        }
    }

    /// Hash of the committed header.
    pub fn committed_hash(&self) -> Hash {
        self.committed.hash()
    }
}

impl NetworkMessage for DtoLedgerHeaderAndProof {
    fn message_type_id() -> &'static str {
        "ledger.header_proof"
    }
}

/// Unverified command batch as received from a peer during catch-up.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct DtoCommandsAndProof {
    /// Commands claimed to span the versions between the two headers.
    pub commands: Vec<Command>,

    /// Proof of the state the batch starts from.
    pub start_header: DtoLedgerHeaderAndProof,

    /// Proof of the state the batch ends at.
    pub end_header: DtoLedgerHeaderAndProof,
}

impl NetworkMessage for DtoCommandsAndProof {
    fn message_type_id() -> &'static str {
        "ledger.commands_proof"
    }
}
