mod area;
mod bounding_box;
mod is_valid;
mod naked_edges;

pub use area::Area;
pub use bounding_box::{Aabb, BoundingBox};
pub use is_valid::IsValid;
pub use naked_edges::NakedEdges;
