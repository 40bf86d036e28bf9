use crate::error::Result;
use crate::topology::{SolidId, TopologyStore};

use super::{TessellateFace, TessellationParams, TriangleMesh};

/// Tessellates all faces of a solid into a combined triangle mesh.
pub struct TessellateSolid {
    solid: SolidId,
    params: TessellationParams,
}

impl TessellateSolid {
    /// Creates a new `TessellateSolid` operation.
    #[must_use]
    pub fn new(solid: SolidId, params: TessellationParams) -> Self {
        Self { solid, params }
    }

    /// Executes the tessellation, returning a combined triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or any of its faces cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let mut combined = TriangleMesh::default();
        for face_id in store.solid_faces(self.solid)? {
            let face_mesh = TessellateFace::new(face_id, self.params).execute(store)?;
            combined.merge(&face_mesh);
        }
        Ok(combined)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Circle;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeCylinder;

    #[test]
    fn capped_cylinder_mesh_covers_all_faces() {
        let mut store = TopologyStore::new();
        let circle = Circle::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let solid = MakeCylinder::new(circle, 2.0)
            .with_caps(true, true)
            .execute(&mut store)
            .unwrap();

        let mesh = TessellateSolid::new(solid, TessellationParams::default())
            .execute(&store)
            .unwrap();
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        assert_eq!(mesh.vertices.len(), mesh.uvs.len());

        let expected = 2.0 * std::f64::consts::PI * (1.0 * 2.0 + 1.0);
        assert!((mesh.area() - expected).abs() < expected * 0.01);
        assert!(mesh.normals.iter().any(|n| (n + Vector3::z()).norm() < 1e-9));
        assert!(mesh.normals.iter().any(|n| (n - Vector3::z()).norm() < 1e-9));
    }
}
