use crate::core::geometry::*;

#[cfg(not(feature = "float-as-double"))]
pub type Float = f32;
#[cfg(feature = "float-as-double")]
pub type Float = f64;

pub type Vector2f = Vector2<Float>;
pub type Point2f = Vector2<Float>;

pub type Vector3f = Vector3<Float>;
