//! Domain-specific identifier types.

use sbor::prelude::*;
use std::fmt;

/// Consensus epoch number.
///
/// An epoch is the period during which one validator set is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct Epoch(pub u64);

impl Epoch {
    /// First epoch.
    pub const GENESIS: Self = Epoch(0);

    /// Get the next epoch.
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

/// Consensus view (round) within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct View(pub u64);

impl View {
    /// Genesis view, only ever occupied by epoch-boot vertices.
    pub const GENESIS: Self = View(0);

    /// Get the next view.
    pub fn next(self) -> Self {
        View(self.0 + 1)
    }

    /// Check if this is the genesis view.
    pub fn is_genesis(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View({})", self.0)
    }
}

/// Position in the committed command log.
///
/// Version N is the state after applying the first N commands; genesis is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct StateVersion(pub u64);

impl StateVersion {
    /// Pre-genesis version.
    pub const GENESIS: Self = StateVersion(0);

    /// Get the next state version.
    pub fn next(self) -> Self {
        StateVersion(self.0 + 1)
    }

    /// Get the previous state version (None at genesis).
    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(StateVersion(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for StateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Validator identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct ValidatorId(pub u64);

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.0)
    }
}

/// Vote power (stake weight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct VotePower(pub u64);

impl VotePower {
    /// Create from u64, ensuring it's at least 1.
    pub fn new(power: u64) -> Self {
        VotePower(power.max(1))
    }

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Check whether `voted` power is a supermajority (> 2/3) of `total`.
    pub fn has_quorum(voted: u64, total: u64) -> bool {
        voted * 3 > total * 2
    }
}

impl fmt::Display for VotePower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
