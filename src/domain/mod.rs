//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - route selection enums (`RouteSpec`, `FitRoute`)
//! - the loaded dataset (`Dataset`, `Observation`)
//! - fit outputs (`Coefficients`, `RouteFit`, `LstsqDiagnostics`, etc.)

pub mod types;

pub use types::*;
