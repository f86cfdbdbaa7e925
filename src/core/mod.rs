//! Link layer - Core traits, types, and constants.
//!
//! This module provides the wire constants, the error type, and the device
//! abstractions the rest of the crate is built on.

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::*;
pub use traits::*;
