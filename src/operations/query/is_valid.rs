use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::TOLERANCE;
use crate::topology::{SolidId, TopologyStore, WireId};

/// Validates the topological and geometric consistency of a body.
///
/// Checks that every wire is connected end to start, that closed wires
/// return to their first vertex, and that each edge's curve passes through
/// its vertices at the recorded parameters.
pub struct IsValid {
    solid: SolidId,
    tolerance: f64,
}

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            tolerance: TOLERANCE * 1e3,
        }
    }

    /// Sets the distance tolerance for vertex/curve agreement.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the validation, returning `true` if the body is valid.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> bool {
        match self.check(store) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "body failed validation");
                false
            }
        }
    }

    fn check(&self, store: &TopologyStore) -> Result<()> {
        let faces = store.solid_faces(self.solid)?;
        if faces.is_empty() {
            return Err(TopologyError::InvalidTopology("body has no faces".into()).into());
        }
        for face_id in faces {
            for wire_id in store.face(face_id)?.wires() {
                self.check_wire(store, wire_id)?;
            }
        }
        Ok(())
    }

    fn check_wire(&self, store: &TopologyStore, wire_id: WireId) -> Result<()> {
        let wire = store.wire(wire_id)?;
        let Some(first) = wire.edges.first() else {
            return Err(TopologyError::InvalidTopology("empty wire".into()).into());
        };

        let mut previous_end = None;
        for oe in &wire.edges {
            let edge = store.edge(oe.edge)?;
            let (from_v, to_v) = oe.vertices(edge);
            let (from_t, to_t) = oe.parameters(edge);

            if previous_end.is_some_and(|end| end != from_v) {
                return Err(TopologyError::InvalidTopology("wire is disconnected".into()).into());
            }

            let curve = edge.curve.as_curve();
            for (vertex, t) in [(from_v, from_t), (to_v, to_t)] {
                let expected = store.vertex(vertex)?.point;
                let actual = curve.evaluate(t)?;
                if (expected - actual).norm() > self.tolerance {
                    return Err(TopologyError::InvalidTopology(format!(
                        "edge curve misses its vertex by {}",
                        (expected - actual).norm()
                    ))
                    .into());
                }
            }
            previous_end = Some(to_v);
        }

        let start = first.vertices(store.edge(first.edge)?).0;
        if wire.is_closed && previous_end != Some(start) {
            return Err(TopologyError::WireNotClosed.into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Circle, Line};
    use crate::geometry::surface::Plane;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeCylinder, MakePlanarBreps};
    use crate::topology::{
        EdgeCurve, EdgeData, FaceData, FaceSurface, OrientedEdge, ShellData, SolidData, WireData,
    };

    fn unit_circle() -> Circle {
        Circle::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn tube_is_valid() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(unit_circle(), 3.0).execute(&mut store).unwrap();
        assert!(IsValid::new(solid).execute(&store));
    }

    #[test]
    fn capped_downward_cylinder_is_valid() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(unit_circle(), -3.0)
            .with_caps(true, true)
            .execute(&mut store)
            .unwrap();
        assert!(IsValid::new(solid).execute(&store));
    }

    #[test]
    fn disk_is_valid() {
        let mut store = TopologyStore::new();
        let curve = unit_circle().to_nurbs().unwrap();
        let solids = MakePlanarBreps::new(curve, 0.01).execute(&mut store).unwrap();
        assert!(IsValid::new(solids[0]).execute(&store));
    }

    #[test]
    fn open_wire_marked_closed_is_invalid() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin().into());
        let b = store.add_vertex(Point3::new(1.0, 0.0, 0.0).into());
        let (line, len) = Line::through(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let edge = store.add_edge(EdgeData {
            start: a,
            end: b,
            curve: EdgeCurve::Line(line),
            t_start: 0.0,
            t_end: len,
        });
        let wire = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(edge, true)],
            is_closed: true,
        });
        let face = store.add_face(FaceData {
            surface: FaceSurface::Plane(
                Plane::from_normal(Point3::origin(), Vector3::z()).unwrap(),
            ),
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
        assert!(!IsValid::new(solid).execute(&store));
    }

    #[test]
    fn missing_solid_is_invalid() {
        let mut other = TopologyStore::new();
        let solid = MakeCylinder::new(unit_circle(), 1.0).execute(&mut other).unwrap();
        assert!(!IsValid::new(solid).execute(&TopologyStore::new()));
    }
}
