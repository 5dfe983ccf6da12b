pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Decode, Fetch, Health, Pipeline, Serve, Upload};
