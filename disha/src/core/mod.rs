//! Core foundation layer.
//!
//! Bottom layer of the locator with no internal dependencies besides the
//! error type. Everything else builds on these types.

pub mod types;
