//! Ledger accumulator: a hash chain over the committed command log.
//!
//! The accumulator is the sole source of truth for "this command sequence
//! really produced this ledger state in this order". It knows nothing about
//! signatures, epochs or validators, and has no state of its own, so it is
//! safe to call from any thread.

use crate::{Command, Hash};

/// Fold one command hash into the chain.
///
/// `H(parent || command_hash)`: deterministic and collision-resistant as
/// long as the underlying hash is.
pub fn accumulate(parent: &Hash, command_hash: &Hash) -> Hash {
    Hash::from_parts(&[parent.as_bytes(), command_hash.as_bytes()])
}

/// Fold a sequence of command hashes into the chain, starting at `start`.
pub fn chain_digest(start: &Hash, command_hashes: impl IntoIterator<Item = Hash>) -> Hash {
    command_hashes
        .into_iter()
        .fold(*start, |parent, hash| accumulate(&parent, &hash))
}

/// Check that folding `commands` over `start` reaches exactly `end`.
pub fn verify(start: &Hash, commands: &[Command], end: &Hash) -> bool {
    chain_digest(start, commands.iter().map(Command::hash)) == *end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(payloads: &[&[u8]]) -> Vec<Command> {
        payloads.iter().map(|p| Command::new(p.to_vec())).collect()
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let start = Hash::from_bytes(b"start");
        assert!(verify(&start, &[], &start));
    }

    #[test]
    fn test_fold_then_verify() {
        let start = Hash::ZERO;
        let cmds = commands(&[b"a", b"b", b"c"]);

        let end = chain_digest(&start, cmds.iter().map(Command::hash));
        assert!(verify(&start, &cmds, &end));
    }

    #[test]
    fn test_verify_rejects_flipped_command_byte() {
        let start = Hash::from_bytes(b"genesis");
        let cmds = commands(&[b"a", b"b", b"c"]);
        let end = chain_digest(&start, cmds.iter().map(Command::hash));

        let mut corrupted = cmds.clone();
        let mut payload = corrupted[1].payload().to_vec();
        payload[0] ^= 0x01;
        corrupted[1] = Command::new(payload);

        assert!(!verify(&start, &corrupted, &end));
    }

    #[test]
    fn test_verify_rejects_reordering() {
        let start = Hash::from_bytes(b"genesis");
        let cmds = commands(&[b"a", b"b"]);
        let end = chain_digest(&start, cmds.iter().map(Command::hash));

        let reordered = vec![cmds[1].clone(), cmds[0].clone()];
        assert!(!verify(&start, &reordered, &end));
    }

    #[test]
    fn test_verify_rejects_wrong_start() {
        let start = Hash::from_bytes(b"genesis");
        let cmds = commands(&[b"a"]);
        let end = chain_digest(&start, cmds.iter().map(Command::hash));

        let wrong_start = Hash::from_bytes(b"not genesis");
        assert!(!verify(&wrong_start, &cmds, &end));
    }
}
