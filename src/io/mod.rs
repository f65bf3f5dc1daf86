//! Input/output helpers.
//!
//! - raw provider documents (`raw`)
//! - dataset CSV export (`export`)
//! - dataset JSON read/write (`dataset`)

pub mod dataset;
pub mod export;
pub mod raw;

pub use dataset::*;
pub use export::*;
pub use raw::*;
