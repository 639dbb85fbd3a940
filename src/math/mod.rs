//! Mathematical utilities: error broadcasting and covariance matrices.

pub mod broadcast;
pub mod covariance;

pub use broadcast::*;
pub use covariance::*;
