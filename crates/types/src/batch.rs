//! Command batches bound to a ledger proof.

use crate::{Command, StateVersion, VerifiedLedgerHeaderAndProof};
use sbor::prelude::*;

/// An ordered run of commands plus the proof of their ledger position.
///
/// Invariant: the commands occupy the contiguous version range ending at the
/// proof's state version, i.e. the first command sits at
/// `proof.state_version - len + 1`. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct VerifiedCommandsAndProof {
    commands: Vec<Command>,
    proof: VerifiedLedgerHeaderAndProof,
}

impl VerifiedCommandsAndProof {
    /// Bind commands to the proof covering them.
    pub fn new(
        commands: Vec<Command>,
        proof: VerifiedLedgerHeaderAndProof,
    ) -> Result<Self, BatchError> {
        if proof.state_version().0 + 1 < commands.len() as u64 {
            return Err(BatchError::InvalidVersionSpan {
                state_version: proof.state_version(),
                commands: commands.len(),
            });
        }
        Ok(Self { commands, proof })
    }

    /// The covered commands in commit order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The proof of the last covered version.
    pub fn proof(&self) -> &VerifiedLedgerHeaderAndProof {
        &self.proof
    }

    /// Version of the first command in the batch.
    pub fn first_version(&self) -> StateVersion {
        StateVersion(self.proof.state_version().0 - self.commands.len() as u64 + 1)
    }

    /// Version of the last command (the proof's version).
    pub fn last_version(&self) -> StateVersion {
        self.proof.state_version()
    }

    /// Number of commands in the batch.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch carries no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands at or before `version`, keeping the proof.
    ///
    /// Fails if `version + 1 < first_version`: the result would need
    /// commands this batch does not contain.
    pub fn truncate_from_version(self, version: StateVersion) -> Result<Self, BatchError> {
        let first = self.first_version();
        if version.0 + 1 < first.0 {
            return Err(BatchError::TruncationGap {
                requested: version,
                first_version: first,
            });
        }

        let drop = (version.0 + 1 - first.0) as usize;
        let drop = drop.min(self.commands.len());
        Ok(Self {
            commands: self.commands[drop..].to_vec(),
            proof: self.proof,
        })
    }
}

/// Errors constructing or truncating a command batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// More commands than versions up to the proven one.
    #[error("{commands} commands cannot end at {state_version}")]
    InvalidVersionSpan {
        /// Proven version.
        state_version: StateVersion,
        /// Command count.
        commands: usize,
    },

    /// Truncation point leaves a gap before the batch's first command.
    #[error("truncating from {requested} requires commands before {first_version}")]
    TruncationGap {
        /// Requested truncation version.
        requested: StateVersion,
        /// First version the batch covers.
        first_version: StateVersion,
    },
}
