//! Data acquisition: remote CSV fetch and synthetic samples.

pub mod advertising;
pub mod sample;

pub use advertising::*;
pub use sample::*;
