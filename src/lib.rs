//! `generation-series` library crate.
//!
//! The binary (`genseries`) is a thin wrapper around this library so that:
//!
//! - the reconstruction core is testable without spawning processes or a network
//! - the document tree can come from any source that implements `document::DocNode`

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod document;
pub mod domain;
pub mod error;
pub mod io;
pub mod reconstruct;
pub mod report;
