pub mod error;
pub mod geometry;
pub mod misc;
pub mod pbrt;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod spectrum;
pub mod tensor;
