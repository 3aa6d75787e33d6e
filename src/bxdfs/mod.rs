pub mod hair;
pub mod measured;
pub mod params;
pub mod tabulated_hair;

pub use hair::*;
pub use measured::*;
pub use params::*;
pub use tabulated_hair::*;
