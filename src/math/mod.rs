/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns a unit vector perpendicular to the given unit vector.
///
/// The result is deterministic: the world X axis is crossed with `axis`
/// unless `axis` is nearly parallel to it, in which case Y is used.
#[must_use]
pub fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    axis.cross(&candidate).normalize()
}

/// Returns `true` if two vectors are parallel (or anti-parallel) within `tol`.
#[must_use]
pub fn is_parallel(a: &Vector3, b: &Vector3, tol: f64) -> bool {
    let (la, lb) = (a.norm(), b.norm());
    if la < TOLERANCE || lb < TOLERANCE {
        return false;
    }
    (a / la).cross(&(b / lb)).norm() < tol
}
