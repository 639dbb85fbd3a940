//! XY data container and its uncertainty sources.

pub mod error_source;
pub mod xy;

pub use error_source::*;
pub use xy::*;
