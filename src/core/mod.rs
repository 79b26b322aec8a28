//! Core layer - the attribute value model and its resolution.
//!
//! This module provides:
//! - [`TimeCode`] / [`TimeSamples`] - Ordered samples of animated attributes
//! - [`Attribute`] - Typed constant-or-sampled attribute values
//! - [`resolve`] - Held-step evaluation at arbitrary times
//! - [`MetaData`] / [`Dictionary`] - Metadata on layers, prims and properties
//! - [`SdfPath`] - Prim and property paths
//! - [`FrameRange`] - Inclusive whole-frame ranges

mod time_code;
mod time_sampling;
mod attribute;
mod resolve;
mod metadata;
mod path;
mod frame_range;

pub use time_code::TimeCode;
pub use time_sampling::TimeSamples;
pub use attribute::{Attribute, Variability};
pub use resolve::{resolve, resolve_many, unioned_sample_times};
pub use metadata::{DictValue, Dictionary, ListOp, MetaData, MetaEntry, MetaValue};
pub use path::{is_identifier, is_property_name, SdfPath};
pub use frame_range::FrameRange;
