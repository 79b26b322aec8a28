//! Per-scenario overrides applied to a template layer.
//!
//! [`apply_overrides`] is the only operation that produces a modified layer.
//! It never touches its input: the template is cloned and the overrides are
//! applied to the copy, in this order:
//!
//! 1. animation gaps
//! 2. attribute overrides
//! 3. `customLayerData` edits
//! 4. frame range
//!
//! Override files are JSON:
//!
//! ```json
//! {
//!   "attributes": [
//!     { "attribute": "inputs:shaping:cone:angle", "value": 180 },
//!     { "prim": "/lights/rect_light", "attribute": "inputs:intensity",
//!       "samples": [[1, 1], [11, 1000]] }
//!   ],
//!   "layerData": [ { "keys": ["renderSettings", "rtx:externalFrameCounter"], "value": 31 } ],
//!   "startTimeCode": 1,
//!   "endTimeCode": 31,
//!   "gaps": [ { "frame": 11, "numFrames": 5 } ]
//! }
//! ```

use super::{Layer, Prim, Property};
use crate::core::{Attribute, DictValue, Dictionary, MetaValue, SdfPath, TimeCode, TimeSamples, Variability};
use crate::util::{Error, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

/// Attribute name the project overrides on every light by default.
pub const CONE_ANGLE_ATTR: &str = "inputs:shaping:cone:angle";

/// A set of overrides for one scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Overrides {
    pub attributes: Vec<AttributeOverride>,
    pub layer_data: Vec<LayerDataOverride>,
    pub start_time_code: Option<f64>,
    pub end_time_code: Option<f64>,
    pub gaps: Vec<AnimationGap>,
}

/// New value for one attribute, or for every prim carrying it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeOverride {
    /// Absolute prim path; when absent the override hits every prim that
    /// already has the attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prim: Option<String>,
    pub attribute: String,
    /// Type token, required only to create an attribute that does not exist.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Constant value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
    /// `[time, value]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<(f64, Json)>>,
}

/// Edit of a (possibly nested) `customLayerData` entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDataOverride {
    pub keys: Vec<String>,
    pub value: Json,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Shift all samples at or after `frame` by `num_frames`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationGap {
    pub frame: f64,
    pub num_frames: f64,
    /// Limit to prims under these paths; empty means every prim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prims: Vec<String>,
}

impl Overrides {
    /// Empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides applied to every light unless a scenario says otherwise.
    pub fn default_light_overrides() -> Self {
        Self::from_defaults([(CONE_ANGLE_ATTR.to_string(), Json::from(180))])
    }

    /// One layer-wide attribute override per `(attribute, value)` pair.
    pub fn from_defaults(defaults: impl IntoIterator<Item = (String, Json)>) -> Self {
        let attributes = defaults
            .into_iter()
            .map(|(attribute, value)| AttributeOverride {
                attribute,
                value: Some(value),
                ..Default::default()
            })
            .collect();
        Self {
            attributes,
            ..Default::default()
        }
    }

    /// Parse an override file.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read an override file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
        Self::from_json_str(&text).map_err(|e| e.in_file(path))
    }

    /// Append another set after this one.
    pub fn extend(&mut self, other: Overrides) {
        self.attributes.extend(other.attributes);
        self.layer_data.extend(other.layer_data);
        self.gaps.extend(other.gaps);
        if other.start_time_code.is_some() {
            self.start_time_code = other.start_time_code;
        }
        if other.end_time_code.is_some() {
            self.end_time_code = other.end_time_code;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.layer_data.is_empty()
            && self.gaps.is_empty()
            && self.start_time_code.is_none()
            && self.end_time_code.is_none()
    }
}

/// Apply `overrides` to a copy of `layer` and return the copy.
pub fn apply_overrides(layer: &Layer, overrides: &Overrides) -> Result<Layer> {
    let mut out = layer.clone();
    for gap in &overrides.gaps {
        apply_gap(&mut out, gap)?;
    }
    for attr in &overrides.attributes {
        apply_attribute(&mut out, attr)?;
    }
    for data in &overrides.layer_data {
        apply_layer_data(&mut out, data)?;
    }
    apply_frame_range(&mut out, overrides.start_time_code, overrides.end_time_code)?;
    Ok(out)
}

fn parse_type(name: &str) -> Result<ValueType> {
    ValueType::from_name(name).ok_or_else(|| Error::InvalidOverride(format!("unknown type '{name}'")))
}

fn apply_attribute(layer: &mut Layer, ov: &AttributeOverride) -> Result<()> {
    if ov.value.is_some() == ov.samples.is_some() {
        return Err(Error::InvalidOverride(format!(
            "{}: exactly one of 'value' or 'samples' is required",
            ov.attribute
        )));
    }
    let declared = ov.type_name.as_deref().map(parse_type).transpose()?;

    let targets: Vec<SdfPath> = match &ov.prim {
        Some(path) => vec![SdfPath::new(path.as_str())?],
        None => layer
            .traverse()
            .filter(|(_, prim)| prim.attribute(&ov.attribute).is_some())
            .map(|(path, _)| path)
            .collect(),
    };
    if targets.is_empty() {
        debug!(attribute = %ov.attribute, "override matched no prims");
    }

    for path in targets {
        let prim = layer
            .prim_at_mut(&path)
            .ok_or_else(|| Error::PrimNotFound(path.to_string()))?;
        let base = match (prim.attribute(&ov.attribute), declared) {
            (Some(existing), Some(ty)) if existing.value_type() != ty => {
                return Err(Error::mismatch(existing.value_type(), ty));
            }
            (Some(existing), _) => existing.clone(),
            (None, Some(ty)) => Attribute::declared(ov.attribute.as_str(), ty)?,
            (None, None) => {
                return Err(Error::PropertyNotFound {
                    prim: path.to_string(),
                    property: ov.attribute.clone(),
                })
            }
        };
        let updated = override_attribute(base, ov)?;
        trace!(prim = %path, attribute = %ov.attribute, "attribute overridden");
        prim.set_property(Property::Attribute(updated));
    }
    Ok(())
}

fn override_attribute(base: Attribute, ov: &AttributeOverride) -> Result<Attribute> {
    let ty = base.value_type();
    if let Some(value) = &ov.value {
        let value = Value::from_json(ty, value)?;
        return base.without_samples().with_default(value);
    }
    let samples = ov.samples.as_deref().unwrap_or_default();
    if base.variability() == Variability::Uniform {
        return Err(Error::InvalidOverride(format!("{} is uniform and cannot be animated", base.name())));
    }
    let samples = samples
        .iter()
        .map(|(t, v)| Ok((TimeCode::new(*t)?, Value::from_json(ty, v)?)))
        .collect::<Result<Vec<_>>>()?;
    let samples = TimeSamples::new(ty, samples)?;
    base.without_default().with_samples(samples)
}

fn infer_type(json: &Json) -> Result<ValueType> {
    match json {
        Json::Bool(_) => Ok(ValueType::BOOL),
        Json::Number(n) if n.as_i64().is_some_and(|v| i32::try_from(v).is_ok()) => Ok(ValueType::INT),
        Json::Number(_) => Ok(ValueType::DOUBLE),
        Json::String(_) => Ok(ValueType::STRING),
        other => Err(Error::InvalidOverride(format!("cannot infer a type for {other}"))),
    }
}

fn apply_layer_data(layer: &mut Layer, ov: &LayerDataOverride) -> Result<()> {
    let Some((leaf, parents)) = ov.keys.split_last() else {
        return Err(Error::InvalidOverride("layer data override with no keys".into()));
    };
    let meta = layer.metadata_mut();
    if meta.get(Layer::CUSTOM_LAYER_DATA_KEY).is_none() {
        meta.set(Layer::CUSTOM_LAYER_DATA_KEY, MetaValue::Dictionary(Dictionary::new()));
    }
    let mut dict = match meta.get_mut(Layer::CUSTOM_LAYER_DATA_KEY) {
        Some(MetaValue::Dictionary(d)) => d,
        _ => return Err(Error::InvalidOverride("customLayerData is not a dictionary".into())),
    };
    for key in parents {
        if dict.get(key).is_none() {
            dict.insert(key.as_str(), DictValue::Dictionary(Dictionary::new()));
        }
        dict = match dict.get_mut(key) {
            Some(DictValue::Dictionary(d)) => d,
            _ => return Err(Error::InvalidOverride(format!("'{key}' is not a dictionary"))),
        };
    }
    let ty = match (dict.get(leaf), &ov.type_name) {
        (_, Some(name)) => parse_type(name)?,
        (Some(DictValue::Typed { ty, .. }), None) => *ty,
        (Some(DictValue::Dictionary(_)), None) => {
            return Err(Error::InvalidOverride(format!("'{leaf}' is a dictionary")))
        }
        (None, None) => infer_type(&ov.value)?,
    };
    let value = Value::from_json(ty, &ov.value)?;
    debug!(keys = ?ov.keys, %ty, "customLayerData overridden");
    dict.insert(leaf.as_str(), DictValue::Typed { ty, value });
    Ok(())
}

fn apply_frame_range(layer: &mut Layer, start: Option<f64>, end: Option<f64>) -> Result<()> {
    if start.is_none() && end.is_none() {
        return Ok(());
    }
    let new_start = start.or(layer.start_time_code());
    let new_end = end.or(layer.end_time_code());
    if let (Some(s), Some(e)) = (new_start, new_end) {
        if e < s || !s.is_finite() || !e.is_finite() {
            return Err(Error::InvalidFrameRange(format!("{s}:{e}")));
        }
    }
    let meta = layer.metadata_mut();
    if let Some(s) = start {
        meta.set(Layer::START_TIME_CODE_KEY, MetaValue::Number(s));
    }
    if let Some(e) = end {
        meta.set(Layer::END_TIME_CODE_KEY, MetaValue::Number(e));
    }
    Ok(())
}

fn apply_gap(layer: &mut Layer, gap: &AnimationGap) -> Result<()> {
    if !gap.num_frames.is_finite() || gap.num_frames < 1.0 {
        return Err(Error::InvalidOverride(format!("gap length must be >= 1, got {}", gap.num_frames)));
    }
    TimeCode::new(gap.frame)?;
    let roots = gap
        .prims
        .iter()
        .map(|p| SdfPath::new(p.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let mut shifted = 0usize;
    for prim in layer.prims_mut() {
        shifted += gap_prim(prim, &SdfPath::root().child(prim.name()), gap, &roots)?;
    }
    debug!(frame = gap.frame, num_frames = gap.num_frames, shifted, "animation gap inserted");
    Ok(())
}

fn under_any(path: &SdfPath, roots: &[SdfPath]) -> bool {
    roots.is_empty()
        || roots.iter().any(|root| {
            path == root || path.as_str().strip_prefix(root.as_str()).is_some_and(|rest| rest.starts_with('/'))
        })
}

fn gap_prim(prim: &mut Prim, path: &SdfPath, gap: &AnimationGap, roots: &[SdfPath]) -> Result<usize> {
    let mut shifted = 0;
    if under_any(path, roots) {
        for property in prim.properties_mut() {
            let Property::Attribute(attr) = property else {
                continue;
            };
            let Some(samples) = attr.time_samples() else {
                continue;
            };
            let attr_path = path.property(attr.name());
            if let Some(new_samples) = insert_gap(samples, attr.value_type(), gap.frame, gap.num_frames, &attr_path)? {
                *attr = attr.clone().with_samples(new_samples)?;
                shifted += 1;
            }
        }
    }
    for child in prim.children_mut() {
        let child_path = path.child(child.name());
        shifted += gap_prim(child, &child_path, gap, roots)?;
    }
    Ok(shifted)
}

/// Shift samples at or after `frame` by `num_frames`.
///
/// When the value changes across `frame`, hold samples are added at `frame`
/// and `frame + num_frames - 1` so the gap shows the post-gap value. A value
/// that is mid-change (previous and next samples differ, and the next sample
/// is not exactly at `frame`) cannot be split and is an error.
/// Returns None when nothing needs to move.
pub fn insert_gap(
    samples: &TimeSamples,
    ty: ValueType,
    frame: f64,
    num_frames: f64,
    attr_path: &SdfPath,
) -> Result<Option<TimeSamples>> {
    let split = samples.iter().position(|(t, _)| t.value() >= frame);
    let Some(split) = split else {
        return Ok(None);
    };
    let all: Vec<(TimeCode, &Value)> = samples.iter().collect();
    let (before, after) = all.split_at(split);

    let mut out: BTreeMap<TimeCode, Value> = BTreeMap::new();
    for (t, v) in before {
        out.insert(*t, (*v).clone());
    }
    for (t, v) in after {
        out.insert(TimeCode::new(t.value() + num_frames)?, (*v).clone());
    }

    if let Some((_, before_val)) = before.last() {
        let (after_time, after_val) = after[0];
        if *before_val != after_val {
            if after_time.value() != frame {
                return Err(Error::AnimationInProgress {
                    frame,
                    attribute: attr_path.to_string(),
                });
            }
            for hold in [frame, frame + num_frames - 1.0] {
                out.insert(TimeCode::new(hold)?, after_val.clone());
            }
        }
    }
    TimeSamples::new(ty, out).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetaData;
    use serde_json::json;

    fn float_samples(pairs: &[(i32, f32)]) -> Vec<(TimeCode, Value)> {
        pairs.iter().map(|(t, v)| (TimeCode::from(*t), Value::Float(*v))).collect()
    }

    fn template() -> Layer {
        let rect = Prim::def("RectLight", "rect_light")
            .unwrap()
            .with_property(
                Attribute::sampled("inputs:intensity", ValueType::FLOAT, float_samples(&[(1, 1.0), (11, 1000.0)]))
                    .unwrap(),
            )
            .with_property(Attribute::constant(CONE_ANGLE_ATTR, ValueType::FLOAT, Value::Float(90.0)).unwrap());
        let disk = Prim::def("DiskLight", "disk_light")
            .unwrap()
            .with_property(Attribute::constant(CONE_ANGLE_ATTR, ValueType::FLOAT, Value::Float(45.0)).unwrap());
        let mut meta = MetaData::new();
        meta.set("startTimeCode", MetaValue::Number(1.0));
        meta.set("endTimeCode", MetaValue::Number(31.0));
        Layer::new()
            .with_metadata(meta)
            .with_prim(Prim::def("Scope", "lights").unwrap().with_child(rect).with_child(disk))
    }

    fn path(p: &str) -> SdfPath {
        SdfPath::new(p).unwrap()
    }

    #[test]
    fn test_returns_new_layer() {
        let layer = template();
        let before = layer.clone();
        let out = apply_overrides(&layer, &Overrides::default_light_overrides()).unwrap();
        assert_eq!(layer, before);
        assert_ne!(out, layer);
        for light in ["/lights/rect_light", "/lights/disk_light"] {
            assert_eq!(out.resolve(&path(light), CONE_ANGLE_ATTR, 1.0).unwrap(), &Value::Float(180.0));
        }
    }

    #[test]
    fn test_override_samples() {
        let overrides = Overrides::from_json_str(
            r#"{"attributes": [{"prim": "/lights/rect_light", "attribute": "inputs:intensity",
                "samples": [[1, 0], [11, 1000], [31, 1000]]}]}"#,
        )
        .unwrap();
        let out = apply_overrides(&template(), &overrides).unwrap();
        let attr = out.attribute_at(&path("/lights/rect_light"), "inputs:intensity").unwrap();
        assert_eq!(attr.num_samples(), 3);
        assert_eq!(attr.get(5.0).unwrap(), &Value::Float(0.0));
    }

    #[test]
    fn test_override_constant_replaces_samples() {
        let overrides = Overrides {
            attributes: vec![AttributeOverride {
                prim: Some("/lights/rect_light".into()),
                attribute: "inputs:intensity".into(),
                value: Some(json!(50)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let out = apply_overrides(&template(), &overrides).unwrap();
        let attr = out.attribute_at(&path("/lights/rect_light"), "inputs:intensity").unwrap();
        assert!(attr.is_constant());
        assert_eq!(attr.get(20.0).unwrap(), &Value::Float(50.0));
    }

    #[test]
    fn test_override_errors() {
        let missing = Overrides::from_json_str(
            r#"{"attributes": [{"prim": "/lights/rect_light", "attribute": "inputs:radius", "value": 1}]}"#,
        )
        .unwrap();
        assert!(matches!(apply_overrides(&template(), &missing), Err(Error::PropertyNotFound { .. })));

        let created = Overrides::from_json_str(
            r#"{"attributes": [{"prim": "/lights/rect_light", "attribute": "inputs:radius",
                "type": "float", "value": 0.5}]}"#,
        )
        .unwrap();
        let out = apply_overrides(&template(), &created).unwrap();
        assert_eq!(out.resolve(&path("/lights/rect_light"), "inputs:radius", 0.0).unwrap(), &Value::Float(0.5));

        let wrong = Overrides::from_json_str(
            r#"{"attributes": [{"prim": "/lights/rect_light", "attribute": "inputs:intensity", "value": "bright"}]}"#,
        )
        .unwrap();
        assert!(matches!(apply_overrides(&template(), &wrong), Err(Error::TypeMismatch { .. })));

        let both = AttributeOverride {
            attribute: "inputs:intensity".into(),
            value: Some(json!(1)),
            samples: Some(vec![(1.0, json!(1))]),
            ..Default::default()
        };
        let both = Overrides { attributes: vec![both], ..Default::default() };
        assert!(matches!(apply_overrides(&template(), &both), Err(Error::InvalidOverride(_))));
    }

    #[test]
    fn test_layer_data_and_frame_range() {
        let overrides = Overrides::from_json_str(
            r#"{
                "layerData": [
                    {"keys": ["MovieCaptureSettings", "capture_frame_end"], "value": 40},
                    {"keys": ["MovieCaptureSettings", "capture_name"], "value": "rect-rtx"}
                ],
                "endTimeCode": 40
            }"#,
        )
        .unwrap();
        let out = apply_overrides(&template(), &overrides).unwrap();
        let data = out.custom_layer_data().unwrap();
        assert_eq!(data.value_at(&["MovieCaptureSettings", "capture_frame_end"]), Some(&Value::Int(40)));
        assert_eq!(
            data.value_at(&["MovieCaptureSettings", "capture_name"]),
            Some(&Value::String("rect-rtx".into()))
        );
        assert_eq!(out.end_time_code(), Some(40.0));
        assert_eq!(out.start_time_code(), Some(1.0));

        let bad = Overrides { end_time_code: Some(0.0), ..Default::default() };
        assert!(matches!(apply_overrides(&template(), &bad), Err(Error::InvalidFrameRange(_))));
    }

    #[test]
    fn test_insert_gap_holds_values() {
        let ty = ValueType::FLOAT;
        let samples = TimeSamples::new(ty, float_samples(&[(1, 1.0), (11, 1000.0), (21, 5.0)])).unwrap();
        let out = insert_gap(&samples, ty, 11.0, 5.0, &path("/l.inputs:intensity")).unwrap().unwrap();
        let times: Vec<f64> = out.times().map(TimeCode::value).collect();
        assert_eq!(times, vec![1.0, 11.0, 15.0, 16.0, 26.0]);
        assert_eq!(out.held_value(10.0), &Value::Float(1.0));
        assert_eq!(out.held_value(13.0), &Value::Float(1000.0));
        assert_eq!(out.held_value(25.0), &Value::Float(1000.0));
        assert_eq!(out.held_value(26.0), &Value::Float(5.0));
    }

    #[test]
    fn test_insert_gap_constant_and_after_end() {
        let ty = ValueType::FLOAT;
        let samples = TimeSamples::new(ty, float_samples(&[(1, 1.0), (11, 1.0)])).unwrap();
        let out = insert_gap(&samples, ty, 5.0, 3.0, &path("/l.a")).unwrap().unwrap();
        let times: Vec<f64> = out.times().map(TimeCode::value).collect();
        assert_eq!(times, vec![1.0, 14.0]);

        assert_eq!(insert_gap(&samples, ty, 50.0, 3.0, &path("/l.a")).unwrap(), None);
    }

    #[test]
    fn test_insert_gap_mid_animation_fails() {
        let ty = ValueType::FLOAT;
        let samples = TimeSamples::new(ty, float_samples(&[(1, 1.0), (11, 1000.0)])).unwrap();
        let err = insert_gap(&samples, ty, 5.0, 3.0, &path("/l.inputs:intensity")).unwrap_err();
        assert!(matches!(err, Error::AnimationInProgress { frame, .. } if frame == 5.0));
    }

    #[test]
    fn test_gap_override_filters_prims() {
        let overrides = Overrides {
            gaps: vec![AnimationGap { frame: 11.0, num_frames: 2.0, prims: vec!["/lights/disk_light".into()] }],
            ..Default::default()
        };
        let out = apply_overrides(&template(), &overrides).unwrap();
        assert_eq!(out, template());

        let overrides = Overrides {
            gaps: vec![AnimationGap { frame: 11.0, num_frames: 2.0, prims: Vec::new() }],
            ..Default::default()
        };
        let out = apply_overrides(&template(), &overrides).unwrap();
        let attr = out.attribute_at(&path("/lights/rect_light"), "inputs:intensity").unwrap();
        let times: Vec<f64> = attr.sample_times().into_iter().map(TimeCode::value).collect();
        assert_eq!(times, vec![1.0, 11.0, 12.0, 13.0]);
    }
}
