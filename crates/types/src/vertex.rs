//! BFT vertex model: vote data, quorum certificates and vertices.
//!
//! The voting protocol itself lives outside this workspace; these types
//! exist so the ledger can read ancestry out of committed vertices and so
//! epoch changes can seed the next epoch's consensus instance.

use crate::{Command, Epoch, Hash, LedgerHeader, TimestampedSignatures, ValidatorSet, View};
use sbor::prelude::*;

/// Consensus-level header for one vertex: its id plus the ledger header its
/// commit would produce.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct BftHeader {
    /// Id of the vertex this header describes.
    pub vertex_id: Hash,

    /// View the vertex was proposed in.
    pub view: View,

    /// Ledger state fingerprint after executing the vertex.
    pub ledger_header: LedgerHeader,
}

/// What a vote covers: the proposed vertex and its certified parent.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct VoteData {
    /// Vertex being voted on.
    pub proposed: BftHeader,

    /// Parent the proposed vertex extends.
    pub parent: BftHeader,
}

/// A supermajority of votes over one [`VoteData`].
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct QuorumCertificate {
    vote_data: VoteData,
    signatures: TimestampedSignatures,
}

impl QuorumCertificate {
    /// Wrap vote data with the signatures that certify it.
    pub fn new(vote_data: VoteData, signatures: TimestampedSignatures) -> Self {
        Self {
            vote_data,
            signatures,
        }
    }

    /// Self-certifying certificate seeding a new epoch.
    ///
    /// Carries no signatures; both headers reference the genesis vertex.
    pub fn of_genesis(genesis_vertex: &Vertex, ledger_header: LedgerHeader) -> Self {
        let header = BftHeader {
            vertex_id: genesis_vertex.id(),
            view: View::GENESIS,
            ledger_header,
        };
        Self {
            vote_data: VoteData {
                proposed: header.clone(),
                parent: header,
            },
            signatures: TimestampedSignatures::none(),
        }
    }

    /// The certified (proposed) vertex header.
    pub fn proposed(&self) -> &BftHeader {
        &self.vote_data.proposed
    }

    /// The parent header of the certified vertex.
    pub fn parent(&self) -> &BftHeader {
        &self.vote_data.parent
    }

    /// The full vote data.
    pub fn vote_data(&self) -> &VoteData {
        &self.vote_data
    }

    /// The certifying signatures (empty for genesis certificates).
    pub fn signatures(&self) -> &TimestampedSignatures {
        &self.signatures
    }

    /// Quorum timestamp: weighted median of the signers' timestamps, or the
    /// certified header's own timestamp for signatureless genesis QCs.
    pub fn timestamp(&self) -> u64 {
        self.signatures
            .weighted_timestamp()
            .unwrap_or(self.vote_data.proposed.ledger_header.timestamp)
    }
}

/// One vertex in the consensus DAG.
///
/// The carried QC certifies the parent vertex; the optional command is what
/// committing this vertex would append to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Vertex {
    id: Hash,
    epoch: Epoch,
    view: View,
    qc: QuorumCertificate,
    command: Option<Command>,
}

impl Vertex {
    /// Create a vertex extending the parent certified by `qc`.
    pub fn new(epoch: Epoch, view: View, qc: QuorumCertificate, command: Option<Command>) -> Self {
        let id = Hash::from_bytes(&id_preimage(
            epoch,
            view,
            &qc.proposed().vertex_id,
            &qc.proposed().ledger_header,
            command.as_ref(),
        ));
        Self {
            id,
            epoch,
            view,
            qc,
            command,
        }
    }

    /// Create the genesis vertex for an epoch, computing its id internally.
    pub fn genesis(epoch: Epoch, ledger_header: LedgerHeader) -> Self {
        let id = Hash::from_bytes(&genesis_id_preimage(epoch, &ledger_header));
        Self::genesis_with_id(epoch, ledger_header, id)
    }

    /// Create the genesis vertex for an epoch with an externally hashed id.
    ///
    /// The id must be a hash of [`genesis_id_preimage`].
    pub fn genesis_with_id(epoch: Epoch, ledger_header: LedgerHeader, id: Hash) -> Self {
        let header = BftHeader {
            vertex_id: id,
            view: View::GENESIS,
            ledger_header: ledger_header.clone(),
        };
        Self {
            id,
            epoch,
            view: View::GENESIS,
            qc: QuorumCertificate::new(
                VoteData {
                    proposed: header.clone(),
                    parent: header,
                },
                TimestampedSignatures::none(),
            ),
            command: None,
        }
    }

    /// Content id of this vertex.
    pub fn id(&self) -> Hash {
        self.id
    }

    /// Epoch the vertex belongs to.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// View the vertex was proposed in.
    pub fn view(&self) -> View {
        self.view
    }

    /// QC certifying the parent vertex.
    pub fn qc(&self) -> &QuorumCertificate {
        &self.qc
    }

    /// Header of the parent vertex.
    pub fn parent_header(&self) -> &BftHeader {
        self.qc.proposed()
    }

    /// Ledger header of the parent vertex.
    pub fn parent_ledger_header(&self) -> &LedgerHeader {
        &self.qc.proposed().ledger_header
    }

    /// Command carried by this vertex, if any.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Check if this is an epoch genesis vertex.
    pub fn is_genesis(&self) -> bool {
        self.view.is_genesis()
    }
}

/// Preimage of a vertex id.
fn id_preimage(
    epoch: Epoch,
    view: View,
    parent_vertex_id: &Hash,
    parent_ledger_header: &LedgerHeader,
    command: Option<&Command>,
) -> Vec<u8> {
    let command_hash = command.map(Command::hash).unwrap_or(Hash::ZERO);
    let mut preimage = Vec::with_capacity(128);
    preimage.extend_from_slice(b"vertex:");
    preimage.extend_from_slice(&epoch.0.to_le_bytes());
    preimage.extend_from_slice(&view.0.to_le_bytes());
    preimage.extend_from_slice(parent_vertex_id.as_bytes());
    preimage.extend_from_slice(parent_ledger_header.hash().as_bytes());
    preimage.extend_from_slice(command_hash.as_bytes());
    preimage
}

/// Preimage of an epoch genesis vertex id.
///
/// Genesis vertices have no parent; the preimage binds the epoch to the
/// committed ledger state it boots from.
pub fn genesis_id_preimage(epoch: Epoch, ledger_header: &LedgerHeader) -> Vec<u8> {
    id_preimage(epoch, View::GENESIS, &Hash::ZERO, ledger_header, None)
}

/// Everything a fresh consensus instance needs to start an epoch.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct BftConfiguration {
    /// Validator set authoritative for the epoch.
    pub validator_set: ValidatorSet,

    /// Genesis vertex the first proposals extend.
    pub genesis_vertex: Vertex,

    /// Self-certifying QC over the genesis vertex.
    pub genesis_qc: QuorumCertificate,
}
