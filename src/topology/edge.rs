use crate::geometry::curve::{Circle, Curve, Line, NurbsCurve};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The geometric curve associated with an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A straight segment, such as the seam of a cylindrical face.
    Line(Line),
    /// A full circle.
    Circle(Circle),
    /// A rational B-spline.
    Nurbs(NurbsCurve),
}

impl EdgeCurve {
    /// Returns the underlying curve as a trait object.
    #[must_use]
    pub fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(line) => line,
            Self::Circle(circle) => circle,
            Self::Nurbs(nurbs) => nurbs,
        }
    }
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries a geometric curve
/// that defines the shape of the edge between them. A closed edge
/// (full circle) starts and ends at the same vertex.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The geometric curve defining this edge's shape.
    pub curve: EdgeCurve,
    /// Parameter on the curve corresponding to the start vertex.
    pub t_start: f64,
    /// Parameter on the curve corresponding to the end vertex.
    pub t_end: f64,
}

impl EdgeData {
    /// Returns `true` if the edge starts and ends at the same vertex.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }
}
