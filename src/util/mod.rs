//! Utility types and functions for luxtest.
//!
//! This module contains fundamental types used throughout the library:
//! - [`BaseType`] / [`ValueType`] - Declared attribute types
//! - [`Value`] - Typed attribute values
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod value_type;
mod value;
mod error;
mod math;

pub use value_type::*;
pub use value::*;
pub use error::*;
pub use math::*;
