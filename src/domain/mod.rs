//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request-side values (`RequestWindow`, `QueryParams`)
//! - reconstruction values (`Segment`, `TimestampedSample`, `Dataset`)
//! - run configuration and the saved dataset file (`RunConfig`, `DatasetFile`)

pub mod types;

pub use types::*;
