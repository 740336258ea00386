//! Ledger headers and quorum-backed ledger proofs.

use crate::{Epoch, Hash, StateVersion, TimestampedSignatures, View};
use sbor::prelude::*;

/// Fingerprint of the committed ledger state after applying all commands up
/// to `state_version`.
///
/// Created once per commit; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct LedgerHeader {
    /// Epoch this header was committed in.
    pub epoch: Epoch,

    /// Consensus view that produced the commit.
    pub view: View,

    /// Position in the committed command log.
    pub state_version: StateVersion,

    /// Accumulator digest over all commands up to `state_version`.
    pub accumulator: Hash,

    /// Quorum timestamp (milliseconds).
    pub timestamp: u64,

    /// Whether this commit ends the epoch.
    pub end_of_epoch: bool,
}

impl LedgerHeader {
    /// The pre-genesis header: version 0, zero accumulator.
    pub fn genesis() -> Self {
        Self {
            epoch: Epoch::GENESIS,
            view: View::GENESIS,
            state_version: StateVersion::GENESIS,
            accumulator: Hash::ZERO,
            timestamp: 0,
            end_of_epoch: false,
        }
    }

    /// Compute the content hash of this header.
    pub fn hash(&self) -> Hash {
        let bytes = basic_encode(self).expect("LedgerHeader serialization should never fail");
        Hash::from_bytes(&bytes)
    }
}

/// A [`LedgerHeader`] together with a validated quorum of signatures.
///
/// This type is a trust boundary: it is only constructed by code that has
/// already checked the quorum (the sync verifier, the local commit path, or
/// genesis bootstrap). Nothing downstream re-validates it.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct VerifiedLedgerHeaderAndProof {
    header: LedgerHeader,
    signatures: TimestampedSignatures,
}

impl VerifiedLedgerHeaderAndProof {
    /// Wrap a header whose signature quorum has been checked by the caller.
    pub fn from_quorum(header: LedgerHeader, signatures: TimestampedSignatures) -> Self {
        Self { header, signatures }
    }

    /// The self-evident genesis proof (no signatures).
    pub fn genesis() -> Self {
        Self {
            header: LedgerHeader::genesis(),
            signatures: TimestampedSignatures::none(),
        }
    }

    /// The proven header.
    pub fn header(&self) -> &LedgerHeader {
        &self.header
    }

    /// The signatures backing the proof.
    pub fn signatures(&self) -> &TimestampedSignatures {
        &self.signatures
    }

    /// Proven state version.
    pub fn state_version(&self) -> StateVersion {
        self.header.state_version
    }

    /// Proven accumulator digest.
    pub fn accumulator(&self) -> Hash {
        self.header.accumulator
    }

    /// Epoch of the proven header.
    pub fn epoch(&self) -> Epoch {
        self.header.epoch
    }

    /// Quorum timestamp of the proven header.
    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    /// Whether the proven commit ends its epoch.
    pub fn is_end_of_epoch(&self) -> bool {
        self.header.end_of_epoch
    }
}
