pub mod tensor;
pub mod writer;

pub use tensor::*;
pub use writer::*;
