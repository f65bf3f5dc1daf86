//! Provider access: request building and transport.
//!
//! Both sit upstream of the reconstruction core; the core only ever sees the parsed
//! document tree.

pub mod entsoe;
pub mod request;

pub use entsoe::{ClientConfig, EntsoeClient, acknowledgement_reason};
pub use request::{RequestDescriptor, build_request, parse_window_bound};
