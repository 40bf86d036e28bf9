use crate::error::{GeometryError, Result};
use crate::math::{perpendicular_dir, Point2, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// An infinite plane in 3D space.
///
/// Defined by an origin point and two orthonormal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir x v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically so that
    /// `u_dir x v_dir` equals the normalized `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length or not finite.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if !len.is_finite() || len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        let u_dir = perpendicular_dir(&normal);
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point` to the plane along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Projects `point` into the plane's (u, v) coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    /// Returns the same plane moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            origin: self.origin + offset,
            ..self.clone()
        }
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY)
    }
}
