//! Mathematical utilities: design-matrix construction and linear solvers.

pub mod design;
pub mod lstsq;

pub use design::*;
pub use lstsq::*;
