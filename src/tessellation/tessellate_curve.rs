use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeData, EdgeId, OrientedEdge, TopologyStore, WireId};

use super::{Polyline, TessellationParams};

/// Tessellates a curve (edge) into a polyline.
pub struct TessellateCurve {
    edge: EdgeId,
    params: TessellationParams,
}

impl TessellateCurve {
    /// Creates a new `TessellateCurve` operation.
    #[must_use]
    pub fn new(edge: EdgeId, params: TessellationParams) -> Self {
        Self { edge, params }
    }

    /// Executes the tessellation, returning a polyline from the edge's start
    /// vertex to its end vertex, both included.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing, the parameters are invalid,
    /// or the curve cannot be evaluated.
    pub fn execute(&self, store: &TopologyStore) -> Result<Polyline> {
        self.params.validate()?;
        let edge = store.edge(self.edge)?;
        let points = sample_edge(edge, edge.t_start, edge.t_end, &self.params, true)?;
        Ok(Polyline { points })
    }
}

/// Collects the boundary of a wire as a closed polygon (no repeated end
/// point), following each edge's orientation.
pub(crate) fn wire_polygon(
    store: &TopologyStore,
    wire_id: WireId,
    params: &TessellationParams,
) -> Result<Vec<Point3>> {
    let mut points = Vec::new();
    for oe in &store.wire(wire_id)?.edges {
        let edge = store.edge(oe.edge)?;
        let (from, to) = OrientedEdge::parameters(oe, edge);
        points.extend(sample_edge(edge, from, to, params, false)?);
    }
    Ok(points)
}

/// Samples an edge between two curve parameters.
fn sample_edge(
    edge: &EdgeData,
    from: f64,
    to: f64,
    params: &TessellationParams,
    include_end: bool,
) -> Result<Vec<Point3>> {
    let n = edge_segments(&edge.curve, from, to, params);
    let curve = edge.curve.as_curve();
    let count = if include_end { n + 1 } else { n };
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let frac = i as f64 / n as f64;
            curve.evaluate(from + frac * (to - from))
        })
        .collect()
}

/// Number of segments for an edge span.
fn edge_segments(curve: &EdgeCurve, from: f64, to: f64, params: &TessellationParams) -> usize {
    match curve {
        EdgeCurve::Line(_) => 1,
        EdgeCurve::Circle(circle) => params.angular_segments(circle.radius(), to - from),
        EdgeCurve::Nurbs(nurbs) => {
            // Treat the control polygon as a circle of equal perimeter.
            let perimeter: f64 = nurbs
                .control_points()
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum();
            let domain = nurbs.domain();
            let fraction = if domain.span() > 0.0 {
                (to - from).abs() / domain.span()
            } else {
                1.0
            };
            let radius = perimeter / std::f64::consts::TAU;
            params.angular_segments(radius, std::f64::consts::TAU * fraction)
        }
    }
}
