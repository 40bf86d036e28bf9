use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// An infinite line defined by an origin point and a unit direction.
///
/// `P(t) = origin + t * direction`, so `t` measures arc length.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates a new line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Creates the line through `start` and `end`, returning it together with
    /// the parameter at which `end` is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the two points coincide.
    pub fn through(start: Point3, end: Point3) -> Result<(Self, f64)> {
        let delta = end - start;
        let line = Self::new(start, delta)?;
        Ok((line, delta.norm()))
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn through_reaches_end_point() {
        let start = Point3::new(1.0, 0.0, 0.0);
        let end = Point3::new(1.0, 0.0, 4.0);
        let (line, t_end) = Line::through(start, end).unwrap();
        assert!((t_end - 4.0).abs() < TOLERANCE);
        assert!((line.evaluate(t_end).unwrap() - end).norm() < TOLERANCE);
        assert!((line.direction() - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn coincident_points_fail() {
        let p = Point3::new(2.0, 2.0, 2.0);
        assert!(Line::through(p, p).is_err());
    }
}
