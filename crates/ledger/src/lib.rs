//! Replicated ledger coordination.
//!
//! [`ReplicatedLedger`] is the single writer of committed ledger state: the
//! BFT processor's commits and catch-up sync both funnel through its
//! `commit`, which enforces strictly sequential versions. The
//! [`EpochChangeDetector`] watches the committed stream and synthesizes the
//! next epoch's bootstrap configuration when a commit carries a new
//! validator set.

mod coordinator;
mod epoch;

pub use coordinator::{
    CommitListener, CommitOutcome, PreparedCommand, ReplicatedLedger, SyncStatus,
};
pub use epoch::{EpochChange, EpochChangeDetector};
