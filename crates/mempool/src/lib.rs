//! In-memory FIFO mempool.
//!
//! Commands are handed out in arrival order; duplicates are rejected by
//! content hash and the pool is capacity-bounded. All state lives behind
//! one mutex, since the pool is shared between the command-submission path
//! and the ledger's `generate_next_command`/`remove_committed` calls.

use indexmap::IndexMap;
use sequitur_core::Mempool;
use sequitur_types::{Command, Hash};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;

/// Default capacity bound.
pub const DEFAULT_MAX_SIZE: usize = 10_000;

/// Errors adding a command to the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MempoolError {
    /// The pool is at capacity.
    #[error("mempool full: {max_size} commands")]
    Full {
        /// Configured capacity.
        max_size: usize,
    },

    /// A command with the same hash is already pooled.
    #[error("duplicate command {0:?}")]
    Duplicate(Hash),
}

/// FIFO mempool over an insertion-ordered map.
#[derive(Debug)]
pub struct FifoMempool {
    inner: Mutex<IndexMap<Hash, Command>>,
    max_size: usize,
}

impl FifoMempool {
    /// Create a pool with the default capacity.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    /// Create a pool with an explicit capacity bound.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(IndexMap::new()),
            max_size,
        }
    }

    /// Add a client command.
    pub fn add(&self, command: Command) -> Result<(), MempoolError> {
        let mut pool = self.inner.lock().expect("mempool lock poisoned");

        if pool.len() >= self.max_size {
            return Err(MempoolError::Full {
                max_size: self.max_size,
            });
        }

        let hash = command.hash();
        if pool.contains_key(&hash) {
            return Err(MempoolError::Duplicate(hash));
        }

        pool.insert(hash, command);
        Ok(())
    }

    /// Number of pooled commands.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("mempool lock poisoned").len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FifoMempool {
    fn default() -> Self {
        Self::new()
    }
}

impl Mempool for FifoMempool {
    fn get_commands(&self, limit: usize, exclude: &HashSet<Hash>) -> Vec<Command> {
        let pool = self.inner.lock().expect("mempool lock poisoned");
        pool.iter()
            .filter(|(hash, _)| !exclude.contains(*hash))
            .take(limit)
            .map(|(_, command)| command.clone())
            .collect()
    }

    fn remove_committed(&self, command_hash: &Hash) {
        let mut pool = self.inner.lock().expect("mempool lock poisoned");
        // shift_remove keeps the FIFO order of the remaining commands.
        if pool.shift_remove(command_hash).is_some() {
            debug!(command = %command_hash, remaining = pool.len(), "removed committed command");
        }
    }
}
