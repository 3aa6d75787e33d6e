pub mod bxdf;
pub mod cache;
pub mod data;

pub use bxdf::*;
pub use cache::*;
pub use data::*;
