//! Core abstractions for the Sequitur replicated ledger.
//!
//! This crate defines the seams between subsystems:
//!
//! - [`ConsensusEvent`]: the closed set of inputs the event loop merges
//! - [`BftEventProcessor`] / [`VertexSyncProcessor`]: what the loop drives
//! - [`Mempool`] / [`StateComputer`] / [`Hasher`]: capabilities the ledger
//!   consumes from subsystems outside this workspace
//!
//! Nothing here performs I/O.

mod error;
mod event;
mod traits;

pub use error::ProcessorError;
pub use event::{BftUpdate, CommittedBatch, ConsensusEvent, LedgerUpdate, ScheduledTimeout};
pub use traits::{
    BftEventProcessor, Blake3Hasher, Hasher, Mempool, StateComputer, VertexSyncProcessor,
};
