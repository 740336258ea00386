//! Epoch change detection.

use sequitur_core::{CommittedBatch, Hasher};
use sequitur_types::{
    genesis_id_preimage, BftConfiguration, LedgerHeader, QuorumCertificate,
    VerifiedLedgerHeaderAndProof, Vertex, View,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The transition into a new epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochChange {
    /// Proof of the commit that ended the previous epoch.
    pub proof: VerifiedLedgerHeaderAndProof,

    /// Bootstrap configuration for the new epoch's consensus instance.
    pub configuration: BftConfiguration,
}

/// Watches the committed stream for end-of-epoch commits.
///
/// Stateless translation: when a batch carries the next validator set, it
/// synthesizes the new epoch's genesis vertex (referencing the committed
/// accumulator and state version), wraps it in a self-certifying genesis
/// QC, and emits an [`EpochChange`] to its single downstream consumer.
/// Fires at most once per epoch, so this is never on a hot path.
pub struct EpochChangeDetector {
    hasher: Arc<dyn Hasher>,
    epoch_tx: mpsc::UnboundedSender<EpochChange>,
}

impl EpochChangeDetector {
    /// Create a detector emitting on `epoch_tx`.
    pub fn new(hasher: Arc<dyn Hasher>, epoch_tx: mpsc::UnboundedSender<EpochChange>) -> Self {
        Self { hasher, epoch_tx }
    }

    /// Inspect one committed batch.
    pub fn process(&self, batch: &CommittedBatch) {
        let Some(validator_set) = &batch.next_validator_set else {
            return;
        };

        let proof = batch.commands_and_proof.proof().clone();
        let committed = proof.header();
        let next_epoch = committed.epoch.next();

        let genesis_header = LedgerHeader {
            epoch: next_epoch,
            view: View::GENESIS,
            state_version: committed.state_version,
            accumulator: committed.accumulator,
            timestamp: committed.timestamp,
            end_of_epoch: false,
        };

        let vertex_id = self
            .hasher
            .hash(&genesis_id_preimage(next_epoch, &genesis_header));
        let genesis_vertex = Vertex::genesis_with_id(next_epoch, genesis_header.clone(), vertex_id);
        let genesis_qc = QuorumCertificate::of_genesis(&genesis_vertex, genesis_header);

        info!(
            epoch = next_epoch.0,
            state_version = committed.state_version.0,
            validators = validator_set.len(),
            "epoch change"
        );

        let change = EpochChange {
            proof,
            configuration: BftConfiguration {
                validator_set: validator_set.clone(),
                genesis_vertex,
                genesis_qc,
            },
        };
        if self.epoch_tx.send(change).is_err() {
            warn!("epoch change consumer disconnected");
        }
    }
}
