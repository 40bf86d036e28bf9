mod tessellate_curve;
mod tessellate_face;
mod tessellate_solid;

pub use tessellate_curve::TessellateCurve;
pub use tessellate_face::TessellateFace;
pub use tessellate_solid::TessellateSolid;

use crate::error::{Result, TessellationError};
use crate::math::{Point2, Point3, Vector3};

/// Parameters controlling tessellation quality.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Maximum allowed chord deviation from the true geometry.
    pub tolerance: f64,
    /// Minimum number of segments for curves.
    pub min_segments: usize,
    /// Maximum number of segments for curves.
    pub max_segments: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            min_segments: 4,
            max_segments: 256,
        }
    }
}

impl TessellationParams {
    /// Checks that the parameters can drive a tessellation.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] for a non-positive
    /// tolerance or an empty segment range.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(TessellationError::InvalidParameters(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            ))
            .into());
        }
        if self.min_segments < 3 || self.min_segments > self.max_segments {
            return Err(TessellationError::InvalidParameters(format!(
                "segment range [{}, {}] is invalid",
                self.min_segments, self.max_segments
            ))
            .into());
        }
        Ok(())
    }

    /// Number of segments needed to keep the chord error of an arc of the
    /// given radius and sweep under the tolerance.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn angular_segments(&self, radius: f64, sweep: f64) -> usize {
        if radius > self.tolerance {
            let half_angle = (1.0 - self.tolerance / radius).acos();
            let computed = (sweep.abs() / (2.0 * half_angle)).ceil() as usize;
            computed.clamp(self.min_segments, self.max_segments)
        } else {
            self.min_segments
        }
    }
}

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Appends `other`, re-indexing its triangles.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.indices
            .iter()
            .map(|tri| {
                let v0 = self.vertices[tri[0] as usize];
                let v1 = self.vertices[tri[1] as usize];
                let v2 = self.vertices[tri[2] as usize];
                (v1 - v0).cross(&(v2 - v0)).norm() * 0.5
            })
            .sum()
    }
}
