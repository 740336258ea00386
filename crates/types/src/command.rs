//! Client-submitted commands.

use crate::Hash;
use sbor::prelude::*;
use std::fmt;

/// One client-submitted transaction, opaque to the coordination layer.
///
/// The ledger never interprets the payload; only the state computer does.
/// Immutable once created.
#[derive(Clone, PartialEq, Eq, BasicSbor)]
pub struct Command {
    payload: Vec<u8>,
}

impl Command {
    /// Create a command from an opaque payload.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Content hash of the payload.
    pub fn hash(&self) -> Hash {
        Hash::from_bytes(&self.payload)
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({} bytes, {:?})", self.payload.len(), self.hash())
    }
}
