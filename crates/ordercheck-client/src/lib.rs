//! HTTP access to the spec server.
//!
//! [`SpecClient`] implements [`ordercheck_map::MappingApi`] for the mapping
//! workflow and adds the spec management calls used by the CLI.

#![deny(unsafe_code)]

pub mod client;
pub mod response;

pub use client::{ClientConfig, DEFAULT_BASE_URL, SpecClient};
pub use response::parse_response;
