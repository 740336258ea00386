//! Catch-up sync proof verification.
//!
//! A node that has fallen behind asks peers for the committed commands it
//! is missing. Responses are untrusted: this crate checks that a received
//! batch is internally consistent (the accumulator chain) and externally
//! attested (a weighted signature quorum from the epoch's validator set)
//! before promoting it to the verified form the ledger accepts.

mod verifier;

pub use verifier::{SyncProofVerifier, VerifierError};
