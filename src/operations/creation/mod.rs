mod make_cylinder;
mod make_planar_breps;

pub use make_cylinder::MakeCylinder;
pub use make_planar_breps::MakePlanarBreps;
