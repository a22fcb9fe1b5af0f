pub mod hit_testing;
pub mod shapes;

pub use hit_testing::{point_in_polygon, point_in_rect};
pub use shapes::ShapeKind;
