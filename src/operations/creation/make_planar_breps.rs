use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Curve, NurbsCurve};
use crate::topology::{
    EdgeCurve, EdgeData, FaceData, FaceSurface, OrientedEdge, ShellData, SolidData, SolidId,
    TopologyStore, VertexData, WireData,
};

/// Creates planar bodies bounded by a closed curve.
///
/// Mirrors the usual "planar breps from curve" contract of CAD hosts: the
/// result is a list, empty when the curve does not bound a planar region
/// within the tolerance (open curve, non-planar curve, straight curve).
/// A single closed planar curve yields exactly one single-face body.
pub struct MakePlanarBreps {
    curve: NurbsCurve,
    tolerance: f64,
}

impl MakePlanarBreps {
    /// Creates a new `MakePlanarBreps` operation.
    #[must_use]
    pub fn new(curve: NurbsCurve, tolerance: f64) -> Self {
        Self { curve, tolerance }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the tolerance is not a
    /// positive finite number, or a geometry error if the curve cannot be
    /// evaluated at its start.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<SolidId>> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "planar tolerance must be positive, got {}",
                self.tolerance
            ))
            .into());
        }

        if !self.curve.is_closed_within(self.tolerance) {
            debug!(tolerance = self.tolerance, "curve is open, no planar region");
            return Ok(Vec::new());
        }
        let Some(plane) = self.curve.fit_plane(self.tolerance) else {
            debug!(tolerance = self.tolerance, "curve is not planar, no planar region");
            return Ok(Vec::new());
        };

        let domain = self.curve.domain();
        let start = store.add_vertex(VertexData::new(self.curve.evaluate(domain.t_min)?));
        let edge = store.add_edge(EdgeData {
            start,
            end: start,
            curve: EdgeCurve::Nurbs(self.curve.clone()),
            t_start: domain.t_min,
            t_end: domain.t_max,
        });
        // The fitted normal follows the curve's winding, so the forward edge
        // is a counter-clockwise outer loop.
        let wire = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(edge, true)],
            is_closed: true,
        });
        let face = store.add_face(FaceData {
            surface: FaceSurface::Plane(plane),
            outer_wire: wire,
            inner_wires: vec![],
            same_sense: true,
        });
        let shell = store.add_shell(ShellData {
            faces: vec![face],
            is_closed: false,
        });
        let solid = store.add_solid(SolidData {
            outer_shell: shell,
            inner_shells: vec![],
        });

        Ok(vec![solid])
    }
}
