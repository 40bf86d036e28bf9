pub mod curve;
pub mod surface;

pub use curve::{Circle, Curve, CurveDomain, Line, NurbsCurve};
pub use surface::{Cylinder, Plane, Surface, SurfaceDomain};
