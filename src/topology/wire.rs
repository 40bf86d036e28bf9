use super::edge::{EdgeData, EdgeId};
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a wire in the topology store.
    pub struct WireId;
}

/// An edge with orientation information within a wire.
#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge {
    /// The edge identifier.
    pub edge: EdgeId,
    /// If `true`, the edge is traversed in its natural direction (start → end).
    /// If `false`, the edge is traversed in reverse (end → start).
    pub forward: bool,
}

impl OrientedEdge {
    /// Creates a new oriented edge.
    #[must_use]
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }

    /// Curve parameters `(from, to)` in traversal order.
    #[must_use]
    pub fn parameters(&self, data: &EdgeData) -> (f64, f64) {
        if self.forward {
            (data.t_start, data.t_end)
        } else {
            (data.t_end, data.t_start)
        }
    }

    /// Vertices `(from, to)` in traversal order.
    #[must_use]
    pub fn vertices(&self, data: &EdgeData) -> (VertexId, VertexId) {
        if self.forward {
            (data.start, data.end)
        } else {
            (data.end, data.start)
        }
    }
}

/// Data associated with a topological wire.
///
/// A wire is an ordered sequence of oriented edges forming a connected path.
/// It may be open or closed.
#[derive(Debug, Clone)]
pub struct WireData {
    /// The ordered sequence of oriented edges.
    pub edges: Vec<OrientedEdge>,
    /// Whether this wire forms a closed loop.
    pub is_closed: bool,
}
