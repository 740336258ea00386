//! Verification of untrusted command batches.

use sequitur_messages::DtoCommandsAndProof;
use sequitur_types::{
    accumulator, ledger_proof_message, ValidatorSet, VerifiedCommandsAndProof,
    VerifiedLedgerHeaderAndProof,
};
use tracing::{debug, warn};

/// Why a peer-supplied batch was rejected.
///
/// Both variants are per-peer failures, not local defects: the caller
/// discards the batch and retries elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    /// The hash-chain fold over the batch does not reach the claimed end
    /// accumulator (corrupted or forged commands).
    #[error("command sequence does not match the claimed accumulator chain")]
    BadCommandSequence,

    /// The signatures on the end header do not meet the weighted quorum
    /// threshold for the validator set.
    #[error("signatures below quorum: {signed_power} of {total_power}")]
    InsufficientQuorum {
        /// Power of the valid signatures present.
        signed_power: u64,

        /// Total power of the validator set.
        total_power: u64,
    },
}

/// Turns a [`DtoCommandsAndProof`] from an untrusted peer into a
/// [`VerifiedCommandsAndProof`], or rejects it.
///
/// Verification never mutates the ledger: callers feed the verified result
/// into the ledger's commit path exactly like a locally produced commit, so
/// a single code path stays the only writer of ledger state.
///
/// The validator set must be the one authoritative for the batch's epoch
/// and is treated as an immutable snapshot for the duration of the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProofVerifier;

impl SyncProofVerifier {
    /// Create a verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify one batch.
    pub fn verify(
        &self,
        validator_set: &ValidatorSet,
        batch: DtoCommandsAndProof,
    ) -> Result<VerifiedCommandsAndProof, VerifierError> {
        let start = &batch.start_header.committed;
        let end = &batch.end_header.committed;

        // The commands must span exactly the claimed version range and
        // fold to the claimed end accumulator.
        let claimed_span = end.state_version.0.wrapping_sub(start.state_version.0);
        if claimed_span != batch.commands.len() as u64 {
            warn!(
                start = start.state_version.0,
                end = end.state_version.0,
                commands = batch.commands.len(),
                "sync batch version span mismatch"
            );
            return Err(VerifierError::BadCommandSequence);
        }
        if !accumulator::verify(&start.accumulator, &batch.commands, &end.accumulator) {
            warn!(
                start = start.state_version.0,
                end = end.state_version.0,
                "sync batch failed accumulator verification"
            );
            return Err(VerifierError::BadCommandSequence);
        }

        // Accumulate only cryptographically valid signatures from known
        // validators; everything else contributes no power.
        let end_header_hash = batch.end_header.committed_hash();
        let mut validation_state = validator_set.new_validation_state();
        for signature in batch.end_header.signatures.iter() {
            let Some(validator) = validator_set.get(signature.validator_id) else {
                debug!(signer = %signature.validator_id, "signature from unknown validator");
                continue;
            };
            let message = ledger_proof_message(&end_header_hash, signature.timestamp);
            if !validator.public_key.verify(&message, &signature.signature) {
                debug!(signer = %signature.validator_id, "invalid signature on sync proof");
                continue;
            }
            validation_state.add_signature(
                signature.validator_id,
                signature.timestamp,
                signature.signature.clone(),
            );
        }

        if !validation_state.complete() {
            return Err(VerifierError::InsufficientQuorum {
                signed_power: validation_state.signed_power(),
                total_power: validation_state.total_power(),
            });
        }

        let proof = VerifiedLedgerHeaderAndProof::from_quorum(
            batch.end_header.committed,
            validation_state.signatures(),
        );
        VerifiedCommandsAndProof::new(batch.commands, proof)
            .map_err(|_| VerifierError::BadCommandSequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequitur_messages::DtoLedgerHeaderAndProof;
    use sequitur_types::accumulator::chain_digest;
    use sequitur_types::{
        BftHeader, Command, Epoch, Hash, KeyPair, LedgerHeader, StateVersion,
        TimestampedSignature, TimestampedSignatures, ValidatorId, ValidatorInfo, View,
    };

    fn keypair(id: u64) -> KeyPair {
        KeyPair::from_seed(&[id as u8 + 1; 32])
    }

    fn validator_set() -> ValidatorSet {
        ValidatorSet::new(
            (0..4)
                .map(|i| ValidatorInfo {
                    validator_id: ValidatorId(i),
                    public_key: keypair(i).public_key(),
                    voting_power: 1,
                })
                .collect(),
        )
    }

    fn header_at(version: u64, accumulator: Hash) -> LedgerHeader {
        LedgerHeader {
            epoch: Epoch(1),
            view: View(version),
            state_version: StateVersion(version),
            accumulator,
            timestamp: 1_000 + version,
            end_of_epoch: false,
        }
    }

    fn dto_header(header: LedgerHeader, signers: &[u64]) -> DtoLedgerHeaderAndProof {
        let header_hash = header.hash();
        let signatures = TimestampedSignatures::new(
            signers
                .iter()
                .map(|&id| {
                    let timestamp = 2_000 + id;
                    TimestampedSignature {
                        validator_id: ValidatorId(id),
                        timestamp,
                        weight: 1,
                        signature: keypair(id)
                            .sign(&ledger_proof_message(&header_hash, timestamp)),
                    }
                })
                .collect(),
        );
        let bft_header = BftHeader {
            vertex_id: Hash::from_bytes(b"vertex"),
            view: header.view,
            ledger_header: header.clone(),
        };
        DtoLedgerHeaderAndProof {
            parent: bft_header.clone(),
            proposed: bft_header,
            committed: header,
            signatures,
        }
    }

    /// Batch covering versions `start + 1 ..= end`, signed by `signers`.
    fn batch(start_version: u64, count: u64, signers: &[u64]) -> DtoCommandsAndProof {
        let commands: Vec<Command> = (0..count)
            .map(|i| Command::new(format!("cmd-{}", start_version + 1 + i).into_bytes()))
            .collect();

        let start_accumulator = Hash::from_bytes(b"start");
        let end_accumulator =
            chain_digest(&start_accumulator, commands.iter().map(Command::hash));

        DtoCommandsAndProof {
            commands,
            start_header: dto_header(header_at(start_version, start_accumulator), signers),
            end_header: dto_header(
                header_at(start_version + count, end_accumulator),
                signers,
            ),
        }
    }

    #[test]
    fn test_valid_batch_is_promoted() {
        let verified = SyncProofVerifier::new()
            .verify(&validator_set(), batch(4, 6, &[0, 1, 2]))
            .expect("batch should verify");

        assert_eq!(verified.first_version(), StateVersion(5));
        assert_eq!(verified.last_version(), StateVersion(10));
        assert_eq!(verified.len(), 6);
    }

    #[test]
    fn test_corrupted_command_rejected() {
        let mut bad = batch(4, 6, &[0, 1, 2]);
        let mut payload = bad.commands[2].payload().to_vec();
        payload[0] ^= 0x01;
        bad.commands[2] = Command::new(payload);

        assert_eq!(
            SyncProofVerifier::new().verify(&validator_set(), bad),
            Err(VerifierError::BadCommandSequence)
        );
    }

    #[test]
    fn test_version_span_mismatch_rejected() {
        let mut bad = batch(4, 6, &[0, 1, 2]);
        bad.commands.pop();

        assert_eq!(
            SyncProofVerifier::new().verify(&validator_set(), bad),
            Err(VerifierError::BadCommandSequence)
        );
    }

    #[test]
    fn test_below_quorum_rejected() {
        assert_eq!(
            SyncProofVerifier::new().verify(&validator_set(), batch(4, 6, &[0, 1])),
            Err(VerifierError::InsufficientQuorum {
                signed_power: 2,
                total_power: 4,
            })
        );
    }

    #[test]
    fn test_forged_signature_contributes_no_power() {
        let mut forged = batch(4, 6, &[0, 1, 2]);
        // Replace validator 2's signature with one from a key outside the set.
        let header_hash = forged.end_header.committed_hash();
        forged.end_header.signatures = TimestampedSignatures::new(
            forged
                .end_header
                .signatures
                .iter()
                .cloned()
                .map(|mut entry| {
                    if entry.validator_id == ValidatorId(2) {
                        entry.signature = KeyPair::from_seed(&[99; 32])
                            .sign(&ledger_proof_message(&header_hash, entry.timestamp));
                    }
                    entry
                })
                .collect(),
        );

        assert_eq!(
            SyncProofVerifier::new().verify(&validator_set(), forged),
            Err(VerifierError::InsufficientQuorum {
                signed_power: 2,
                total_power: 4,
            })
        );
    }

    #[test]
    fn test_unknown_signer_ignored() {
        // Three valid signers plus an unknown one: still verifies, and the
        // promoted proof keeps only power-bearing signatures.
        let mut extended = batch(4, 6, &[0, 1, 2]);
        let header_hash = extended.end_header.committed_hash();
        let mut entries: Vec<_> = extended.end_header.signatures.iter().cloned().collect();
        entries.push(TimestampedSignature {
            validator_id: ValidatorId(42),
            timestamp: 9_999,
            weight: 1,
            signature: KeyPair::from_seed(&[42; 32])
                .sign(&ledger_proof_message(&header_hash, 9_999)),
        });
        extended.end_header.signatures = TimestampedSignatures::new(entries);

        let verified = SyncProofVerifier::new()
            .verify(&validator_set(), extended)
            .expect("unknown signer must not poison the batch");
        assert_eq!(verified.proof().signatures().count(), 3);
    }
}
