//! Layers: metadata plus a forest of prims.

use super::Prim;
use crate::core::{Attribute, Dictionary, FrameRange, MetaData, MetaValue, SdfPath};
use crate::util::{Error, Result, Value};

/// Default `#usda` header version.
pub const USDA_VERSION: &str = "1.0";

/// A single scene description unit.
///
/// Layers are plain values: cloning one gives an independent copy, and
/// edits go through [`crate::apply_overrides`], which returns a new layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    version: String,
    metadata: MetaData,
    prims: Vec<Prim>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    /// Empty `#usda 1.0` layer.
    pub fn new() -> Self {
        Self {
            version: USDA_VERSION.to_string(),
            metadata: MetaData::new(),
            prims: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_prim(mut self, prim: Prim) -> Self {
        self.prims.push(prim);
        self
    }

    /// Header version (`1.0` in `#usda 1.0`).
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    /// Root prims in authored order.
    pub fn prims(&self) -> &[Prim] {
        &self.prims
    }

    // === Layer metadata keys ===

    pub const START_TIME_CODE_KEY: &'static str = "startTimeCode";
    pub const END_TIME_CODE_KEY: &'static str = "endTimeCode";
    pub const FPS_KEY: &'static str = "framesPerSecond";
    pub const TCPS_KEY: &'static str = "timeCodesPerSecond";
    pub const UP_AXIS_KEY: &'static str = "upAxis";
    pub const METERS_PER_UNIT_KEY: &'static str = "metersPerUnit";
    pub const DEFAULT_PRIM_KEY: &'static str = "defaultPrim";
    pub const CUSTOM_LAYER_DATA_KEY: &'static str = "customLayerData";
    pub const SUB_LAYERS_KEY: &'static str = "subLayers";

    fn number(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(MetaValue::as_f64)
    }

    pub fn start_time_code(&self) -> Option<f64> {
        self.number(Self::START_TIME_CODE_KEY)
    }

    pub fn end_time_code(&self) -> Option<f64> {
        self.number(Self::END_TIME_CODE_KEY)
    }

    pub fn frames_per_second(&self) -> Option<f64> {
        self.number(Self::FPS_KEY)
    }

    pub fn time_codes_per_second(&self) -> Option<f64> {
        self.number(Self::TCPS_KEY)
    }

    pub fn meters_per_unit(&self) -> Option<f64> {
        self.number(Self::METERS_PER_UNIT_KEY)
    }

    pub fn up_axis(&self) -> Option<&str> {
        self.metadata.get(Self::UP_AXIS_KEY).and_then(MetaValue::as_str)
    }

    pub fn default_prim(&self) -> Option<&str> {
        self.metadata.get(Self::DEFAULT_PRIM_KEY).and_then(MetaValue::as_str)
    }

    pub fn custom_layer_data(&self) -> Option<&Dictionary> {
        self.metadata
            .get(Self::CUSTOM_LAYER_DATA_KEY)
            .and_then(MetaValue::as_dictionary)
    }

    /// Sublayer asset paths. These are opaque: never opened or composed.
    pub fn sub_layers(&self) -> Vec<&str> {
        match self.metadata.get(Self::SUB_LAYERS_KEY) {
            Some(MetaValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    MetaValue::Asset(path) => Some(path.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whole-frame range spanned by `startTimeCode`..`endTimeCode`.
    pub fn frame_range(&self) -> Option<FrameRange> {
        let start = self.start_time_code()?.floor() as i64;
        let end = self.end_time_code()?.ceil() as i64;
        FrameRange::new(start, end).ok()
    }

    // === Navigation ===

    /// Prim at an absolute prim path.
    pub fn prim_at(&self, path: &SdfPath) -> Option<&Prim> {
        let mut names = path.prim_names();
        let first = names.next()?;
        let mut prim = self.prims.iter().find(|p| p.name() == first)?;
        for name in names {
            prim = prim.child(name)?;
        }
        Some(prim)
    }

    pub(crate) fn prim_at_mut(&mut self, path: &SdfPath) -> Option<&mut Prim> {
        let mut names = path.prim_names();
        let first = names.next()?;
        let mut prim = self.prims.iter_mut().find(|p| p.name() == first)?;
        for name in names {
            prim = prim.children_mut().iter_mut().find(|c| c.name() == name)?;
        }
        Some(prim)
    }

    /// Attribute on the prim at `prim_path`.
    pub fn attribute_at(&self, prim_path: &SdfPath, name: &str) -> Result<&Attribute> {
        let prim = self
            .prim_at(prim_path)
            .ok_or_else(|| Error::PrimNotFound(prim_path.to_string()))?;
        prim.attribute(name).ok_or_else(|| Error::PropertyNotFound {
            prim: prim_path.to_string(),
            property: name.to_string(),
        })
    }

    /// Resolve an attribute at `time` (held-step).
    pub fn resolve(&self, prim_path: &SdfPath, name: &str, time: f64) -> Result<&Value> {
        self.attribute_at(prim_path, name)?.get(time)
    }

    /// Depth-first, pre-order walk over every prim with its path.
    pub fn traverse(&self) -> Traverse<'_> {
        let stack = self
            .prims
            .iter()
            .rev()
            .map(|p| (SdfPath::root().child(p.name()), p))
            .collect();
        Traverse { stack }
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    pub(crate) fn prims_mut(&mut self) -> &mut Vec<Prim> {
        &mut self.prims
    }

    // === Statistics ===

    pub fn num_prims(&self) -> usize {
        self.traverse().count()
    }

    pub fn num_attributes(&self) -> usize {
        self.traverse().map(|(_, p)| p.attributes().count()).sum()
    }

    pub fn num_sampled_attributes(&self) -> usize {
        self.traverse()
            .map(|(_, p)| p.attributes().filter(|a| a.is_sampled()).count())
            .sum()
    }
}

/// Iterator returned by [`Layer::traverse`].
pub struct Traverse<'a> {
    stack: Vec<(SdfPath, &'a Prim)>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (SdfPath, &'a Prim);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, prim) = self.stack.pop()?;
        for child in prim.children().iter().rev() {
            self.stack.push((path.child(child.name()), child));
        }
        Some((path, prim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeCode;
    use crate::util::ValueType;

    fn sample_layer() -> Layer {
        let light = Prim::def("RectLight", "rect_light").unwrap().with_property(
            Attribute::sampled(
                "inputs:intensity",
                ValueType::FLOAT,
                [(TimeCode::from(1), Value::Float(1.0)), (TimeCode::from(11), Value::Float(1000.0))],
            )
            .unwrap(),
        );
        let mut meta = MetaData::new();
        meta.set("startTimeCode", MetaValue::Number(1.0));
        meta.set("endTimeCode", MetaValue::Number(31.0));
        meta.set("upAxis", MetaValue::String("Y".into()));
        Layer::new()
            .with_metadata(meta)
            .with_prim(Prim::def("Scope", "lights").unwrap().with_child(light))
            .with_prim(Prim::def("Camera", "camera").unwrap())
    }

    #[test]
    fn test_metadata_accessors() {
        let layer = sample_layer();
        assert_eq!(layer.start_time_code(), Some(1.0));
        assert_eq!(layer.end_time_code(), Some(31.0));
        assert_eq!(layer.up_axis(), Some("Y"));
        assert_eq!(layer.frame_range(), Some(FrameRange { start: 1, end: 31 }));
        assert_eq!(layer.frames_per_second(), None);
        assert!(layer.sub_layers().is_empty());
    }

    #[test]
    fn test_traverse_order() {
        let layer = sample_layer();
        let paths: Vec<String> = layer.traverse().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["/lights", "/lights/rect_light", "/camera"]);
        assert_eq!(layer.num_prims(), 3);
        assert_eq!(layer.num_attributes(), 1);
        assert_eq!(layer.num_sampled_attributes(), 1);
    }

    #[test]
    fn test_resolve_by_path() {
        let layer = sample_layer();
        let path = SdfPath::new("/lights/rect_light").unwrap();
        assert_eq!(layer.resolve(&path, "inputs:intensity", 12.0).unwrap(), &Value::Float(1000.0));

        let err = layer.resolve(&path, "inputs:width", 1.0).unwrap_err();
        assert!(matches!(err, Error::PropertyNotFound { .. }));

        let missing = SdfPath::new("/lights/nope").unwrap();
        assert!(matches!(layer.resolve(&missing, "x", 1.0), Err(Error::PrimNotFound(_))));
    }
}
