use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, SQRT_2, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::surface::Plane;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain, NurbsCurve};

/// A full circle in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric domain is `[0, 2*pi)` and the
/// curve is always closed.
///
/// `P(t) = center + radius * cos(t) * ref_dir + radius * sin(t) * binormal`
/// where `binormal = normal x ref_dir`.
#[derive(Debug, Clone)]
pub struct Circle {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the circle plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// or the reference direction is not perpendicular to the normal.
    pub fn new(center: Point3, radius: f64, normal: Vector3, ref_dir: Vector3) -> Result<Self> {
        if !radius.is_finite() || radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("circle radius must be positive".into()).into(),
            );
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
        })
    }

    /// Creates a circle centered at the plane origin, lying in the plane.
    ///
    /// The plane's U direction becomes the zero-angle direction, so the
    /// circle winds counter-clockwise around the plane normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn on_plane(plane: &Plane, radius: f64) -> Result<Self> {
        Self::new(*plane.origin(), radius, *plane.plane_normal(), *plane.u_dir())
    }

    /// Returns the center of the circle.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the circle plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the reference direction (t=0 direction).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Computes the binormal direction (`normal x ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    /// Returns a copy of this circle moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            center: self.center + offset,
            ..self.clone()
        }
    }

    /// Converts the circle into its exact rational NURBS form.
    ///
    /// The result is the standard degree-2 representation with nine control
    /// points on the circumscribed square, alternate weights of `1/sqrt(2)`
    /// and a knot vector spanning `[0, 2*pi]`. It starts at the same point as
    /// the circle and winds the same way, but is not arc-length parametrized.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting curve is rejected as malformed.
    pub fn to_nurbs(&self) -> Result<NurbsCurve> {
        let binormal = self.binormal();
        let mut control_points = Vec::with_capacity(9);
        let mut weights = Vec::with_capacity(9);
        for k in 0..9_u32 {
            let angle = FRAC_PI_4 * f64::from(k);
            let (dist, weight) = if k % 2 == 0 {
                (self.radius, 1.0)
            } else {
                (self.radius * SQRT_2, FRAC_1_SQRT_2)
            };
            control_points.push(
                self.center + self.ref_dir * (dist * angle.cos()) + binormal * (dist * angle.sin()),
            );
            weights.push(weight);
        }

        let q = TAU / 4.0;
        let knots = vec![
            0.0,
            0.0,
            0.0,
            q,
            q,
            2.0 * q,
            2.0 * q,
            3.0 * q,
            3.0 * q,
            TAU,
            TAU,
            TAU,
        ];

        NurbsCurve::new(2, control_points, weights, knots)
    }
}

impl Curve for Circle {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        Ok(self.center + self.ref_dir * x + binormal * y)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let binormal = self.binormal();
        let dx = -self.radius * t.sin();
        let dy = self.radius * t.cos();
        let tangent = self.ref_dir * dx + binormal * dy;
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, TAU)
    }

    fn is_closed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn xy_circle(radius: f64) -> Circle {
        Circle::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_at_pi_over_2() {
        let c = xy_circle(3.0);
        let p = c.evaluate(FRAC_PI_2).unwrap();
        assert!((p - Point3::new(0.0, 3.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn tangent_at_zero() {
        let c = xy_circle(1.0);
        let t = c.tangent(0.0).unwrap();
        assert!((t - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn on_plane_lies_in_plane() {
        let plane = Plane::from_normal(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0))
            .unwrap();
        let c = Circle::on_plane(&plane, 2.5).unwrap();
        for i in 0..16 {
            let t = TAU * f64::from(i) / 16.0;
            let p = c.evaluate(t).unwrap();
            let d = p - plane.origin();
            assert!(d.dot(plane.plane_normal()).abs() < 1e-9);
            assert!((d.norm() - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_radius() {
        assert!(Circle::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
        assert!(Circle::new(Point3::origin(), -4.0, Vector3::z(), Vector3::x()).is_err());
        assert!(Circle::new(Point3::origin(), f64::NAN, Vector3::z(), Vector3::x()).is_err());
    }

    #[test]
    fn non_perpendicular_ref_dir() {
        let r = Circle::new(
            Point3::origin(),
            1.0,
            Vector3::z(),
            Vector3::new(1.0, 0.0, 1.0),
        );
        assert!(r.is_err());
    }

    #[test]
    fn translated_keeps_radius_and_axis() {
        let c = xy_circle(2.0).translated(&Vector3::new(0.0, 0.0, 7.0));
        assert!((c.center() - Point3::new(0.0, 0.0, 7.0)).norm() < TOLERANCE);
        assert!((c.radius() - 2.0).abs() < TOLERANCE);
        assert!((c.normal() - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn nurbs_form_stays_on_circle() {
        let c = Circle::new(Point3::new(1.0, -1.0, 2.0), 4.0, Vector3::z(), Vector3::x()).unwrap();
        let nurbs = c.to_nurbs().unwrap();
        let domain = nurbs.domain();
        for i in 0..=40 {
            let t = domain.t_min + domain.span() * f64::from(i) / 40.0;
            let p = nurbs.evaluate(t).unwrap();
            let d = p - c.center();
            assert!((d.norm() - 4.0).abs() < 1e-9, "point {p:?} off circle at t={t}");
            assert!(d.z.abs() < 1e-9);
        }
    }

    #[test]
    fn nurbs_form_starts_where_circle_starts() {
        let c = xy_circle(2.0);
        let nurbs = c.to_nurbs().unwrap();
        let start = nurbs.evaluate(0.0).unwrap();
        assert!((start - c.evaluate(0.0).unwrap()).norm() < 1e-12);
        assert!(nurbs.is_closed());
    }
}
