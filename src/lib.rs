//! `xy-fitconf` library crate.
//!
//! Loads XY fit configurations (`x_data`, `y_data`, `x_errors`, `y_errors`),
//! resolves scalar-or-list error declarations into pointwise uncertainties and
//! builds an XY data container with per-axis covariance matrices.
//!
//! The binary (`xyfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the loader and container are reusable by fitting front-ends

pub mod app;
pub mod cli;
pub mod container;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
