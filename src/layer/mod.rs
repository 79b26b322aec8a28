//! Scene layers: prims, properties and overrides.
//!
//! This module provides:
//! - [`Layer`] - Layer metadata plus the root prims
//! - [`Prim`] / [`Property`] / [`Relationship`] - The prim hierarchy
//! - [`Overrides`] / [`apply_overrides`] - Scenario edits producing new layers

mod prim;
#[allow(clippy::module_inception)]
mod layer;
mod overrides;

pub use prim::{Prim, Property, Relationship, Specifier, Targets};
pub use layer::{Layer, Traverse, USDA_VERSION};
pub use overrides::{
    apply_overrides, insert_gap, AnimationGap, AttributeOverride, LayerDataOverride, Overrides,
    CONE_ANGLE_ATTR,
};
