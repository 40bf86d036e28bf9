use std::collections::HashSet;

use crate::error::{Result, TopologyError};
use crate::math::{Point3, Vector3};
use crate::tessellation::{TessellateCurve, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Box extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

/// Computes the axis-aligned bounding box of a body from its sampled edges.
///
/// Faces in this kernel are bounded by their edges (planes, and cylinders
/// spanning their seam height), so the edge samples bound the body to
/// within the tessellation tolerance.
pub struct BoundingBox {
    solid: SolidId,
    params: TessellationParams,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity is missing or an edge cannot be sampled.
    pub fn execute(&self, store: &TopologyStore) -> Result<Aabb> {
        let mut seen = HashSet::new();
        let mut aabb: Option<Aabb> = None;

        for face_id in store.solid_faces(self.solid)? {
            let face = store.face(face_id)?;
            for wire_id in face.wires() {
                for oe in &store.wire(wire_id)?.edges {
                    if !seen.insert(oe.edge) {
                        continue;
                    }
                    let polyline = TessellateCurve::new(oe.edge, self.params).execute(store)?;
                    for p in &polyline.points {
                        match aabb.as_mut() {
                            Some(b) => b.include(p),
                            None => aabb = Some(Aabb { min: *p, max: *p }),
                        }
                    }
                }
            }
        }

        aabb.ok_or_else(|| TopologyError::InvalidTopology("body has no edges".into()).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Circle;
    use crate::operations::creation::MakeCylinder;

    #[test]
    fn tube_bounds() {
        let mut store = TopologyStore::new();
        let circle =
            Circle::new(Point3::new(1.0, 0.0, 0.0), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let solid = MakeCylinder::new(circle, 5.0).execute(&mut store).unwrap();

        let aabb = BoundingBox::new(solid).execute(&store).unwrap();
        assert!((aabb.min.z - 0.0).abs() < 1e-9);
        assert!((aabb.max.z - 5.0).abs() < 1e-9);
        assert!((aabb.min.x + 1.0).abs() < 0.01);
        assert!((aabb.max.x - 3.0).abs() < 0.01);
        assert!((aabb.size().y - 4.0).abs() < 0.02);
    }
}
