//! Core types for the Sequitur replicated ledger.
//!
//! Everything in this crate is an immutable value type: hashes, commands,
//! ledger headers, quorum certificates and the proofs that bind them
//! together. The only "algorithm" here is the ledger accumulator, a pure
//! hash-chain fold with no shared state.

pub mod accumulator;

mod batch;
mod command;
mod crypto;
mod hash;
mod header;
mod identifiers;
mod signing;
mod validators;
mod vertex;

pub use batch::{BatchError, VerifiedCommandsAndProof};
pub use command::Command;
pub use crypto::{KeyPair, PublicKey, Signature};
pub use hash::{Hash, HexError};
pub use header::{LedgerHeader, VerifiedLedgerHeaderAndProof};
pub use identifiers::{Epoch, StateVersion, ValidatorId, View, VotePower};
pub use signing::{ledger_proof_message, DOMAIN_LEDGER_PROOF};
pub use validators::{
    TimestampedSignature, TimestampedSignatures, ValidationState, ValidatorInfo, ValidatorSet,
};
pub use vertex::{
    genesis_id_preimage, BftConfiguration, BftHeader, QuorumCertificate, Vertex, VoteData,
};
