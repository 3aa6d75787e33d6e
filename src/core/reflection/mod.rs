pub mod bxdf;
pub mod bxdf_enum;
pub mod functions;

pub use bxdf::*;
pub use bxdf_enum::*;
pub use functions::*;
