//! Validator sets and weighted quorum accumulation.

use crate::{PublicKey, Signature, ValidatorId, VotePower};
use sbor::prelude::*;
use std::collections::BTreeMap;

/// One validator's membership record.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct ValidatorInfo {
    /// Validator identifier.
    pub validator_id: ValidatorId,

    /// Key the validator signs consensus messages with.
    pub public_key: PublicKey,

    /// Stake weight.
    pub voting_power: u64,
}

/// An ordered set of validators authoritative for one epoch.
///
/// Ordering is canonical (ascending validator id) regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct ValidatorSet {
    validators: Vec<ValidatorInfo>,
}

impl ValidatorSet {
    /// Create a validator set; input order does not matter.
    pub fn new(mut validators: Vec<ValidatorInfo>) -> Self {
        validators.sort_by_key(|v| v.validator_id);
        validators.dedup_by_key(|v| v.validator_id);
        Self { validators }
    }

    /// Members in canonical order.
    pub fn validators(&self) -> &[ValidatorInfo] {
        &self.validators
    }

    /// Look up a member.
    pub fn get(&self, validator_id: ValidatorId) -> Option<&ValidatorInfo> {
        self.validators
            .iter()
            .find(|v| v.validator_id == validator_id)
    }

    /// Check membership.
    pub fn contains(&self, validator_id: ValidatorId) -> bool {
        self.get(validator_id).is_some()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Total voting power of all members.
    pub fn total_voting_power(&self) -> u64 {
        self.validators.iter().map(|v| v.voting_power).sum()
    }

    /// Start a fresh quorum accumulation against this set.
    pub fn new_validation_state(&self) -> ValidationState {
        ValidationState::new(self)
    }
}

/// A signature over a ledger proof, stamped with the signer's local time.
///
/// The carried `weight` mirrors the signer's voting power at signing time;
/// verifiers never trust it and re-derive power from the validator set. It
/// exists so quorum certificates can compute a weighted timestamp without
/// access to the originating epoch's set.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TimestampedSignature {
    /// Signing validator.
    pub validator_id: ValidatorId,

    /// Signer's wall-clock timestamp (milliseconds).
    pub timestamp: u64,

    /// Signer's voting power as recorded at signing time.
    pub weight: u64,

    /// Signature over the domain-separated proof message.
    pub signature: Signature,
}

/// The signature set attached to a quorum proof.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TimestampedSignatures {
    entries: Vec<TimestampedSignature>,
}

impl TimestampedSignatures {
    /// An empty signature set (genesis proofs and self-certifying QCs).
    pub fn none() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create from entries; canonical order is ascending validator id.
    pub fn new(mut entries: Vec<TimestampedSignature>) -> Self {
        entries.sort_by_key(|e| e.validator_id);
        Self { entries }
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &TimestampedSignature> {
        self.entries.iter()
    }

    /// Number of signatures.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no signatures.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted median of the signers' timestamps.
    ///
    /// Returns None for an empty set; callers fall back to an ancestor
    /// header's timestamp in that case (genesis QCs carry no signatures).
    pub fn weighted_timestamp(&self) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }

        let mut stamped: Vec<(u64, u64)> = self
            .entries
            .iter()
            .map(|e| (e.timestamp, e.weight.max(1)))
            .collect();
        stamped.sort_by_key(|(timestamp, _)| *timestamp);

        let total: u64 = stamped.iter().map(|(_, weight)| weight).sum();
        let mut seen = 0u64;
        for (timestamp, weight) in &stamped {
            seen += weight;
            if seen * 2 >= total {
                return Some(*timestamp);
            }
        }
        // Unreachable: the loop covers the full weight.
        stamped.last().map(|(timestamp, _)| *timestamp)
    }
}

/// Accumulates signatures towards a weighted supermajority.
///
/// Freshly created per verification from a [`ValidatorSet`] snapshot; never
/// shared between verifications. Signers outside the set and duplicates
/// contribute no power.
#[derive(Debug)]
pub struct ValidationState {
    power_by_validator: BTreeMap<ValidatorId, u64>,
    signed: BTreeMap<ValidatorId, TimestampedSignature>,
    signed_power: u64,
    total_power: u64,
}

impl ValidationState {
    fn new(validator_set: &ValidatorSet) -> Self {
        let power_by_validator: BTreeMap<_, _> = validator_set
            .validators()
            .iter()
            .map(|v| (v.validator_id, v.voting_power))
            .collect();
        let total_power = power_by_validator.values().sum();

        Self {
            power_by_validator,
            signed: BTreeMap::new(),
            signed_power: 0,
            total_power,
        }
    }

    /// Record a signature.
    ///
    /// Returns false (and adds no power) for unknown signers and for
    /// validators that already signed.
    pub fn add_signature(
        &mut self,
        validator_id: ValidatorId,
        timestamp: u64,
        signature: Signature,
    ) -> bool {
        let Some(&power) = self.power_by_validator.get(&validator_id) else {
            return false;
        };
        if self.signed.contains_key(&validator_id) {
            return false;
        }

        self.signed.insert(
            validator_id,
            TimestampedSignature {
                validator_id,
                timestamp,
                weight: power,
                signature,
            },
        );
        self.signed_power += power;
        true
    }

    /// Check whether the accumulated power is a supermajority.
    pub fn complete(&self) -> bool {
        VotePower::has_quorum(self.signed_power, self.total_power)
    }

    /// Power accumulated so far.
    pub fn signed_power(&self) -> u64 {
        self.signed_power
    }

    /// Total power of the underlying set.
    pub fn total_power(&self) -> u64 {
        self.total_power
    }

    /// The accumulated signatures in canonical order.
    pub fn signatures(&self) -> TimestampedSignatures {
        TimestampedSignatures::new(self.signed.values().cloned().collect())
    }
}
