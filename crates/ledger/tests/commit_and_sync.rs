//! End-to-end commit flow: sequential commits, commit waiters, and catch-up
//! sync through the proof verifier reproducing identical ledger state.

use sequitur_core::StateComputer;
use sequitur_ledger::{ReplicatedLedger, SyncStatus};
use sequitur_mempool::FifoMempool;
use sequitur_messages::{DtoCommandsAndProof, DtoLedgerHeaderAndProof};
use sequitur_sync::{SyncProofVerifier, VerifierError};
use sequitur_types::accumulator::accumulate;
use sequitur_types::{
    ledger_proof_message, BftHeader, Command, Epoch, Hash, KeyPair, LedgerHeader, StateVersion,
    TimestampedSignature, TimestampedSignatures, ValidatorId, ValidatorInfo, ValidatorSet,
    VerifiedLedgerHeaderAndProof, Vertex, View,
};
use std::sync::Arc;

/// State computer that applies commands without interpreting them.
struct NoopComputer;

impl StateComputer for NoopComputer {
    fn prepare(&self, _vertex: &Vertex) -> bool {
        false
    }

    fn commit(
        &self,
        _command: Option<&Command>,
        _proof: &VerifiedLedgerHeaderAndProof,
    ) -> Option<ValidatorSet> {
        None
    }
}

fn keypair(id: u64) -> KeyPair {
    KeyPair::from_seed(&[id as u8 + 1; 32])
}

/// Four equally weighted validators; quorum is three.
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

fn sign_header(header: &LedgerHeader, signers: &[u64]) -> TimestampedSignatures {
    let header_hash = header.hash();
    TimestampedSignatures::new(
        signers
            .iter()
            .map(|&id| {
                let timestamp = header.timestamp;
                TimestampedSignature {
                    validator_id: ValidatorId(id),
                    timestamp,
                    weight: 1,
                    signature: keypair(id).sign(&ledger_proof_message(&header_hash, timestamp)),
                }
            })
            .collect(),
    )
}

/// The ledger history: command and chained header for versions 1..=n.
struct History {
    commands: Vec<Command>,
    headers: Vec<LedgerHeader>,
}

impl History {
    fn build(n: u64) -> Self {
        let mut commands = Vec::new();
        let mut headers = vec![LedgerHeader::genesis()];
        let mut digest = Hash::ZERO;

        for version in 1..=n {
            let command = Command::new(format!("cmd-{version}").into_bytes());
            digest = accumulate(&digest, &command.hash());
            headers.push(LedgerHeader {
                epoch: Epoch(0),
                view: View(version),
                state_version: StateVersion(version),
                accumulator: digest,
                timestamp: 1_000 + version,
                end_of_epoch: false,
            });
            commands.push(command);
        }

        Self { commands, headers }
    }

    fn command(&self, version: u64) -> Command {
        self.commands[version as usize - 1].clone()
    }

    fn proof(&self, version: u64, signers: &[u64]) -> VerifiedLedgerHeaderAndProof {
        let header = self.headers[version as usize].clone();
        let signatures = sign_header(&header, signers);
        VerifiedLedgerHeaderAndProof::from_quorum(header, signatures)
    }

    fn dto_header(&self, version: u64, signers: &[u64]) -> DtoLedgerHeaderAndProof {
        let header = self.headers[version as usize].clone();
        let bft_header = BftHeader {
            vertex_id: Hash::from_bytes(&version.to_le_bytes()),
            view: header.view,
            ledger_header: header.clone(),
        };
        DtoLedgerHeaderAndProof {
            parent: bft_header.clone(),
            proposed: bft_header,
            committed: header.clone(),
            signatures: sign_header(&header, signers),
        }
    }

    fn sync_batch(&self, from: u64, to: u64, signers: &[u64]) -> DtoCommandsAndProof {
        DtoCommandsAndProof {
            commands: (from + 1..=to).map(|v| self.command(v)).collect(),
            start_header: self.dto_header(from, signers),
            end_header: self.dto_header(to, signers),
        }
    }
}

fn fresh_ledger(initial: VerifiedLedgerHeaderAndProof) -> ReplicatedLedger {
    ReplicatedLedger::new(initial, Arc::new(FifoMempool::new()), Arc::new(NoopComputer))
}

#[test]
fn sequential_commits_reach_version_ten_and_fire_waiter() {
    let history = History::build(10);
    let ledger = fresh_ledger(VerifiedLedgerHeaderAndProof::genesis());

    let SyncStatus::Behind(mut listener) = ledger.await_commit(StateVersion(7)) else {
        panic!("version 7 cannot be committed yet");
    };

    for version in 1..=10 {
        let outcome = ledger.commit(
            Some(history.command(version)),
            history.proof(version, &[0, 1, 2]),
        );
        assert!(outcome.is_applied(), "commit of version {version} dropped");
    }

    assert_eq!(ledger.current_version(), StateVersion(10));
    assert_eq!(listener.try_ready(), Some(StateVersion(7)));
}

#[test]
fn sync_batch_below_quorum_is_rejected() {
    let history = History::build(10);
    let verifier = SyncProofVerifier::new();

    let result = verifier.verify(&validator_set(), history.sync_batch(4, 10, &[0, 1]));
    assert_eq!(
        result,
        Err(VerifierError::InsufficientQuorum {
            signed_power: 2,
            total_power: 4,
        })
    );
}

#[test]
fn verified_sync_batch_reproduces_sequential_state() {
    let history = History::build(10);
    let verifier = SyncProofVerifier::new();

    // Sequential node: commits everything as consensus delivers it.
    let sequential = fresh_ledger(VerifiedLedgerHeaderAndProof::genesis());
    for version in 1..=10 {
        sequential.commit(
            Some(history.command(version)),
            history.proof(version, &[0, 1, 2]),
        );
    }

    // Lagging node: stuck at version 4, catches up via sync.
    let lagging = fresh_ledger(history.proof(4, &[0, 1, 2]));

    let verified = verifier
        .verify(&validator_set(), history.sync_batch(4, 10, &[1, 2, 3]))
        .expect("three of four signatures meet quorum");
    assert_eq!(verified.first_version(), StateVersion(5));
    assert_eq!(verified.last_version(), StateVersion(10));

    for (offset, command) in verified.commands().iter().enumerate() {
        let version = verified.first_version().0 + offset as u64;
        let outcome = lagging.commit(
            Some(command.clone()),
            history.proof(version, &[1, 2, 3]),
        );
        assert!(outcome.is_applied(), "sync commit of version {version} dropped");
    }

    assert_eq!(lagging.current_version(), sequential.current_version());
    assert_eq!(
        lagging.last_proof().accumulator(),
        sequential.last_proof().accumulator()
    );
}

#[test]
fn gap_commit_requires_sync_first() {
    let history = History::build(10);
    let ledger = fresh_ledger(VerifiedLedgerHeaderAndProof::genesis());

    // Consensus races ahead of the ledger: version 3 arrives first.
    let outcome = ledger.commit(Some(history.command(3)), history.proof(3, &[0, 1, 2]));
    assert!(!outcome.is_applied());
    assert_eq!(ledger.current_version(), StateVersion::GENESIS);

    // Catch-up delivers the gap, after which the raced commit's version
    // arrives as a stale duplicate and stays dropped.
    for version in 1..=3 {
        ledger.commit(
            Some(history.command(version)),
            history.proof(version, &[0, 1, 2]),
        );
    }
    assert_eq!(ledger.current_version(), StateVersion(3));
    assert!(!ledger
        .commit(Some(history.command(3)), history.proof(3, &[0, 1, 2]))
        .is_applied());
}
