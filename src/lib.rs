pub mod bxdfs;
pub mod core;
