//! Library components of the ordercheck CLI.

#![deny(unsafe_code)]

pub mod logging;
pub mod render;
pub mod settings;
