//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the on-disk fit configuration (`FitConfigFile`, `ErrorInput`, `ErrorSourceDef`)
//! - axis and error-kind enums (`Axis`, `MatrixType`, `ErrorKind`)
//! - exported outputs (`ResolvedFile`, `ResolvedPoint`, `ErrorSourceSummary`)

pub mod types;

pub use types::*;
