//! Network message types.
//!
//! Wire forms only: everything here derives `BasicSbor` and carries no
//! behavior beyond constructors, accessors and signing-message helpers.
//! Trust promotion (DTO → verified) happens in the sync crate.

mod consensus;
mod sync;
mod vertices;

pub use consensus::{Proposal, Vote, ViewTimeoutMessage};
pub use sync::{DtoCommandsAndProof, DtoLedgerHeaderAndProof};
pub use vertices::{GetVerticesErrorResponse, GetVerticesRequest, GetVerticesResponse};

/// A message that can be sent over the network.
pub trait NetworkMessage {
    /// Stable identifier used for topic routing.
    fn message_type_id() -> &'static str;
}

/// Type-safe request/response pairing.
pub trait Request: NetworkMessage {
    /// The response type peers answer with.
    type Response: NetworkMessage;
}
