use crate::error::{GeometryError, Result};
use crate::geometry::surface::Plane;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A rational B-spline curve (NURBS).
///
/// Evaluation works in homogeneous coordinates: each control point is
/// scaled by its weight, blended with the B-spline basis, and projected
/// back by the blended weight.
#[derive(Debug, Clone)]
pub struct NurbsCurve {
    degree: usize,
    control_points: Vec<Point3>,
    weights: Vec<f64>,
    knots: Vec<f64>,
}

impl NurbsCurve {
    /// Creates a new NURBS curve.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the degree is zero, there are
    /// not enough control points for the degree, the weight or knot counts do
    /// not match, a weight is not positive, or the knots decrease.
    pub fn new(
        degree: usize,
        control_points: Vec<Point3>,
        weights: Vec<f64>,
        knots: Vec<f64>,
    ) -> Result<Self> {
        if degree == 0 {
            return Err(GeometryError::Degenerate("NURBS degree must be at least 1".into()).into());
        }
        if control_points.len() <= degree {
            return Err(GeometryError::Degenerate(format!(
                "degree {degree} needs more than {} control points",
                control_points.len()
            ))
            .into());
        }
        if weights.len() != control_points.len() {
            return Err(
                GeometryError::Degenerate("one weight per control point is required".into())
                    .into(),
            );
        }
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(GeometryError::Degenerate("NURBS weights must be positive".into()).into());
        }
        if knots.len() != control_points.len() + degree + 1 {
            return Err(GeometryError::Degenerate(format!(
                "expected {} knots, got {}",
                control_points.len() + degree + 1,
                knots.len()
            ))
            .into());
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(
                GeometryError::Degenerate("knot vector must be non-decreasing".into()).into(),
            );
        }

        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
        })
    }

    /// Returns the polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Returns the control point weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Returns `true` if the curve starts and ends within `tolerance`.
    #[must_use]
    pub fn is_closed_within(&self, tolerance: f64) -> bool {
        let (Some(first), Some(last)) = (self.control_points.first(), self.control_points.last())
        else {
            return false;
        };
        (first - last).norm() <= tolerance
    }

    /// Samples `count` points at uniform parameter steps, excluding the end
    /// of the domain.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn sample(&self, count: usize) -> Result<Vec<Point3>> {
        let domain = self.domain();
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let frac = i as f64 / count as f64;
                self.evaluate(domain.t_min + frac * domain.span())
            })
            .collect()
    }

    /// Fits a plane to the curve if every control point lies within
    /// `tolerance` of it.
    ///
    /// The plane normal follows the curve's winding (right-hand rule), so a
    /// counter-clockwise loop seen from above yields an upward normal.
    /// Returns `None` for non-planar or straight curves.
    #[must_use]
    pub fn fit_plane(&self, tolerance: f64) -> Option<Plane> {
        let samples = self.sample(self.control_points.len() * 4).ok()?;
        let normal = newell_normal(&samples)?;

        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / samples.len() as f64;
        let centroid = samples
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            * inv;
        let origin = Point3::from(centroid);

        // Positive weights keep the curve inside the control hull, so checking
        // the control points bounds the deviation of the whole curve.
        let planar = self
            .control_points
            .iter()
            .all(|p| (p - origin).dot(&normal).abs() <= tolerance);
        if !planar {
            return None;
        }

        Plane::from_normal(origin, normal).ok()
    }

    /// Locates the knot span containing `t` (Piegl & Tiller A2.1).
    fn find_span(&self, t: f64) -> usize {
        let n = self.control_points.len() - 1;
        let p = self.degree;
        if t >= self.knots[n + 1] {
            return n;
        }
        if t <= self.knots[p] {
            return p;
        }
        let (mut low, mut high) = (p, n + 1);
        let mut mid = (low + high) / 2;
        while t < self.knots[mid] || t >= self.knots[mid + 1] {
            if t < self.knots[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    }

    /// Computes the `degree + 1` non-zero basis functions of the given degree
    /// at `t` inside `span` (Piegl & Tiller A2.2).
    fn basis(&self, span: usize, t: f64, degree: usize) -> Vec<f64> {
        let mut n = vec![0.0; degree + 1];
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        n[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                let temp = if denom.abs() < f64::EPSILON {
                    0.0
                } else {
                    n[r] / denom
                };
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }

    /// Derivatives of the `degree + 1` non-zero basis functions at `t`.
    fn basis_derivatives(&self, span: usize, t: f64) -> Vec<f64> {
        let p = self.degree;
        let lower = self.basis(span, t, p - 1);
        #[allow(clippy::cast_precision_loss)]
        let pf = p as f64;
        (0..=p)
            .map(|k| {
                let i = span - p + k;
                let left = if k >= 1 {
                    let denom = self.knots[i + p] - self.knots[i];
                    if denom.abs() < f64::EPSILON {
                        0.0
                    } else {
                        lower[k - 1] / denom
                    }
                } else {
                    0.0
                };
                let right = if k < p {
                    let denom = self.knots[i + p + 1] - self.knots[i + 1];
                    if denom.abs() < f64::EPSILON {
                        0.0
                    } else {
                        lower[k] / denom
                    }
                } else {
                    0.0
                };
                pf * (left - right)
            })
            .collect()
    }

    fn check_parameter(&self, t: f64) -> Result<()> {
        let d = self.domain();
        if t.is_nan() || t < d.t_min - TOLERANCE || t > d.t_max + TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: d.t_min,
                max: d.t_max,
            }
            .into());
        }
        Ok(())
    }

    /// Returns the weighted point sum and weight sum for the given basis values.
    fn blend(&self, span: usize, basis: &[f64]) -> (Vector3, f64) {
        let first = span - self.degree;
        basis
            .iter()
            .enumerate()
            .fold((Vector3::zeros(), 0.0), |(acc, w_acc), (k, b)| {
                let w = self.weights[first + k];
                (acc + self.control_points[first + k].coords * (b * w), w_acc + b * w)
            })
    }
}

impl Curve for NurbsCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        self.check_parameter(t)?;
        let span = self.find_span(t);
        let basis = self.basis(span, t, self.degree);
        let (numerator, weight) = self.blend(span, &basis);
        Ok(Point3::from(numerator / weight))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        self.check_parameter(t)?;
        let span = self.find_span(t);
        let basis = self.basis(span, t, self.degree);
        let d_basis = self.basis_derivatives(span, t);
        let (a, w) = self.blend(span, &basis);
        let (da, dw) = self.blend(span, &d_basis);

        // Quotient rule on C(t) = A(t) / W(t).
        let point = a / w;
        let derivative = (da - point * dw) / w;
        let len = derivative.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(derivative / len)
    }

    fn domain(&self) -> CurveDomain {
        let n = self.control_points.len();
        CurveDomain::new(self.knots[self.degree], self.knots[n])
    }

    fn is_closed(&self) -> bool {
        self.is_closed_within(TOLERANCE)
    }
}

/// Computes the unit normal of a closed polygon using Newell's method.
fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(normal / len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Degree-1 square loop in the XY plane, counter-clockwise from above.
    fn square_loop(z_corner: f64) -> NurbsCurve {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, z_corner),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 0.0),
        ];
        NurbsCurve::new(
            1,
            points,
            vec![1.0; 5],
            vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn linear_curve_interpolates_control_points() {
        let c = square_loop(0.0);
        assert!((c.evaluate(0.0).unwrap() - p(0.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((c.evaluate(1.0).unwrap() - p(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((c.evaluate(2.5).unwrap() - p(0.5, 1.0, 0.0)).norm() < 1e-12);
        assert!((c.evaluate(4.0).unwrap() - p(0.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn linear_tangent_follows_edges() {
        let c = square_loop(0.0);
        assert!((c.tangent(0.5).unwrap() - Vector3::x()).norm() < 1e-9);
        assert!((c.tangent(1.5).unwrap() - Vector3::y()).norm() < 1e-9);
    }

    #[test]
    fn out_of_domain_parameter_fails() {
        let c = square_loop(0.0);
        assert!(c.evaluate(-0.5).is_err());
        assert!(c.evaluate(4.5).is_err());
        assert!(c.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn planar_loop_fits_upward_plane() {
        let c = square_loop(0.0);
        let plane = c.fit_plane(0.01).unwrap();
        assert!((plane.plane_normal() - Vector3::z()).norm() < 1e-9);
        assert!(plane.origin().z.abs() < 1e-9);
    }

    #[test]
    fn warped_loop_has_no_plane() {
        let c = square_loop(0.5);
        assert!(c.fit_plane(0.01).is_none());
    }

    #[test]
    fn slight_warp_within_tolerance_is_planar() {
        let c = square_loop(0.004);
        assert!(c.fit_plane(0.01).is_some());
    }

    #[test]
    fn rejects_bad_knot_count() {
        let r = NurbsCurve::new(
            1,
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
        );
        assert!(r.is_err());
    }

    #[test]
    fn rejects_non_positive_weight() {
        let r = NurbsCurve::new(
            1,
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
            vec![1.0, 0.0],
            vec![0.0, 0.0, 1.0, 1.0],
        );
        assert!(r.is_err());
    }

    #[test]
    fn open_curve_is_not_closed() {
        let c = NurbsCurve::new(
            1,
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)],
            vec![1.0; 3],
            vec![0.0, 0.0, 1.0, 2.0, 2.0],
        )
        .unwrap();
        assert!(!c.is_closed());
    }
}
