use crate::error::{GeometryError, Result};
use crate::geometry::curve::Circle;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// An infinite cylindrical surface in 3D space.
///
/// Defined by a center point on the axis, radius, axis direction, and
/// a reference direction for u=0.
///
/// `P(u, v) = center + radius * cos(u) * ref_dir + radius * sin(u) * binormal + v * axis`
/// where `binormal = axis x ref_dir`.
///
/// The outward normal is `cos(u) * ref_dir + sin(u) * binormal`.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Arguments
    ///
    /// * `center` - A point on the cylinder axis
    /// * `radius` - Radius (must be positive)
    /// * `axis` - Axis direction (will be normalized)
    /// * `ref_dir` - Reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if !radius.is_finite() || radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }

        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Creates the cylinder swept by `circle` along its normal.
    ///
    /// `v = 0` is the circle itself and `u` matches the circle's angle.
    #[must_use]
    pub fn from_circle(circle: &Circle) -> Self {
        Self {
            center: *circle.center(),
            radius: circle.radius(),
            axis: *circle.normal(),
            ref_dir: *circle.ref_dir(),
        }
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the reference direction (u=0).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Computes the (u, v) parameters for a given 3D point on the surface.
    ///
    /// - `u` = angle in `(-pi, pi]` (atan2-based)
    /// - `v` = signed distance along the axis from the center
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let v = dp.dot(&self.axis);
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, v)
    }

    /// Distance from `point` to the axis line.
    #[must_use]
    pub fn radial_distance(&self, point: &Point3) -> f64 {
        let dp = point - self.center;
        (dp - self.axis * dp.dot(&self.axis)).norm()
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * u.cos();
        let y = self.radius * u.sin();
        Ok(self.center + self.ref_dir * x + binormal * y + self.axis * v)
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        let n = self.ref_dir * u.cos() + self.binormal() * u.sin();
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(n / len)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, std::f64::consts::TAU, f64::NEG_INFINITY, f64::INFINITY)
    }
}
