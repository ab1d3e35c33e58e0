//! # Utility Modules
//!
//! Helpers shared by the driver, the logging layer and the CLI.

pub mod hex;

pub use hex::{format_hex_compact, pretty_hex};
