//! Input/output helpers.
//!
//! - fit configuration loading + validation (`load`)
//! - resolved points export (CSV) (`export`)
//! - resolved dataset JSON read/write (`resolved`)

pub mod export;
pub mod load;
pub mod resolved;

pub use export::*;
pub use load::*;
pub use resolved::*;
