//! # luxtest
//!
//! Time-sampled attribute store for USD text layers (`.usda`), built for
//! cross-renderer light tests: scenes whose light parameters step through
//! values frame by frame.
//!
//! ## Modules
//!
//! - [`util`] - Value types, values and errors
//! - [`core`] - Attributes, time samples, held-step resolution, metadata, paths
//! - [`layer`] - Prims, layers and override application
//! - [`usda`] - Text parser and stable serializer
//! - [`describe`] - Per-light descriptions of animated parameters
//! - [`settings`] - Persistent tool settings
//!
//! ## Example
//!
//! ```ignore
//! use luxtest::prelude::*;
//!
//! let layer = luxtest::usda::read_layer("rect_light.usda")?;
//! let light = SdfPath::new("/lights/rect_light")?;
//! let value = layer.resolve(&light, "inputs:intensity", 12.0)?;
//! println!("{value:?}");
//! ```

pub mod util;
pub mod core;
pub mod layer;
pub mod usda;
pub mod describe;
pub mod settings;

// Re-export commonly used types
pub use util::{Error, Result, Value, ValueType};
pub use layer::{apply_overrides, Layer, Overrides};
pub use usda::{parse, serialize};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BaseType, Error, Result, Value, ValueType};
    pub use crate::core::{resolve, Attribute, FrameRange, MetaData, MetaValue, SdfPath, TimeCode, TimeSamples, Variability};
    pub use crate::layer::{apply_overrides, Layer, Overrides, Prim, Property, Relationship};
    pub use crate::usda::{parse, read_layer, serialize, write_layer};
    pub use crate::settings::Settings;
}
