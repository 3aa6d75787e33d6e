pub mod piecewise;
pub mod sampling;

pub use piecewise::*;
pub use sampling::*;
