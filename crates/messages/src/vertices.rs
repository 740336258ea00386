//! Vertex-sync RPC messages.
//!
//! When a node receives a QC for a vertex it has never seen, it fetches the
//! missing ancestry from the QC's signers with these messages.

use crate::{NetworkMessage, Request};
use sbor::prelude::BasicSbor;
use sequitur_types::{Hash, QuorumCertificate, Vertex};

/// Request for a vertex and up to `count - 1` of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct GetVerticesRequest {
    /// Id of the newest requested vertex.
    pub vertex_id: Hash,

    /// Number of vertices to return, walking parents from `vertex_id`.
    pub count: u32,
}

impl GetVerticesRequest {
    /// Create a new vertex request.
    pub fn new(vertex_id: Hash, count: u32) -> Self {
        Self { vertex_id, count }
    }
}

impl NetworkMessage for GetVerticesRequest {
    fn message_type_id() -> &'static str {
        "vertices.request"
    }
}

impl Request for GetVerticesRequest {
    type Response = GetVerticesResponse;
}

/// Successful vertex fetch: newest first, parents following.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct GetVerticesResponse {
    /// The fetched vertices.
    pub vertices: Vec<Vertex>,
}

impl GetVerticesResponse {
    /// Create a new vertex response.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }
}

impl NetworkMessage for GetVerticesResponse {
    fn message_type_id() -> &'static str {
        "vertices.response"
    }
}

/// Peer could not serve the requested vertices.
///
/// Carries the peer's highest QC so the requester can tell whether it has
/// fallen behind the committed frontier and must use ledger catch-up
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct GetVerticesErrorResponse {
    /// The responding peer's highest quorum certificate.
    pub highest_qc: QuorumCertificate,
}

impl GetVerticesErrorResponse {
    /// Create a new error response.
    pub fn new(highest_qc: QuorumCertificate) -> Self {
        Self { highest_qc }
    }
}

impl NetworkMessage for GetVerticesErrorResponse {
    fn message_type_id() -> &'static str {
        "vertices.error"
    }
}
