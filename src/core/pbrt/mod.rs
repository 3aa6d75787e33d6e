pub mod constants;
pub mod functions;
pub mod types;

pub use constants::*;
pub use functions::*;
pub use types::*;

pub use super::error::*;
pub use super::geometry::*;
pub use super::misc::*;
pub use super::reflection::*;
pub use super::rng::*;
pub use super::sampling::*;
pub use super::spectrum::*;
pub use super::tensor::*;
