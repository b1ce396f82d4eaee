//! Fitting layer: the three coefficient routes and their cross-check.

pub mod compare;
pub mod routes;

pub use compare::*;
pub use routes::*;
