//! Domain-separated signing for ledger proofs.
//!
//! Every signed message type carries a unique domain tag prefix so a
//! signature from one context cannot be replayed in another.

use crate::Hash;

/// Domain tag for ledger proof signatures.
///
/// Format: `ledger_proof:` || header_hash || timestamp
pub const DOMAIN_LEDGER_PROOF: &[u8] = b"ledger_proof:";

/// Build the signing message for a ledger header.
///
/// Validators sign this when voting a header into a quorum proof; the sync
/// verifier rebuilds the same message to check each signature.
pub fn ledger_proof_message(header_hash: &Hash, timestamp: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(DOMAIN_LEDGER_PROOF.len() + 40);
    message.extend_from_slice(DOMAIN_LEDGER_PROOF);
    message.extend_from_slice(header_hash.as_bytes());
    message.extend_from_slice(&timestamp.to_le_bytes());
    message
}
