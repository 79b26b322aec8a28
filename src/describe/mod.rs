//! Light parameter descriptions.
//!
//! For every light in a set of layers, records which attributes animate
//! and over which frames, as JSON keyed by light name:
//!
//! ```json
//! {
//!     "rect": {
//!         "attrs": ["inputs:intensity"],
//!         "frame_groups": [
//!             {
//!                 "frames": [1, 10],
//!                 "non_default_constants": {},
//!                 "varying_attr_name": "inputs:intensity",
//!                 "varying_vals": {"1": 1.0, "10": 1000.0}
//!             }
//!         ],
//!         "frames": [1, 10],
//!         "usd_path": "usd/rect_light.usda"
//!     }
//! }
//! ```

mod fallback;
mod frame_group;
mod summary;

pub use fallback::fallback_value;
pub use frame_group::{json_cmp, vals_close, FrameGroup, FrameGroupDesc, FrameGroupFinder, FrameVals};
pub use summary::{format_attr, format_val, group_summaries, summarize_light, SUMMARY_OVERRIDES};

use crate::core::{unioned_sample_times, Attribute, FrameRange};
use crate::layer::{Layer, Prim};
use crate::settings::Settings;
use crate::usda::{find_layers, read_layers};
use crate::util::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Namespace of transform operations, only reported when animated.
const XFORM_OP_PREFIX: &str = "xformOp:";

/// Light descriptions by light name.
pub type Descriptions = BTreeMap<String, LightDescription>;

/// Animated parameters of one light.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightDescription {
    /// First and last rendered frame; absent for unanimated lights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<FrameRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame_groups: Vec<FrameGroupDesc>,
    pub usd_path: String,
}

/// What to do when one light or file fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Stop at the first error.
    #[default]
    Raise,
    /// Log a warning and carry on with the remaining lights and files.
    Warn,
}

impl FromStr for ErrorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raise" => Ok(Self::Raise),
            "warn" => Ok(Self::Warn),
            other => Err(Error::other(format!("unknown error mode '{other}' (expected raise or warn)"))),
        }
    }
}

impl ErrorMode {
    /// Pass `err` on under `Raise`; log it and swallow it under `Warn`.
    fn handle(self, err: Error, what: impl std::fmt::Display) -> Result<()> {
        match self {
            Self::Raise => Err(err),
            Self::Warn => {
                warn!("error processing {what}: {err}");
                Ok(())
            }
        }
    }
}

/// Describe one light prim.
pub fn describe_light(light: &Prim, usd_path: &str, settings: &Settings) -> Result<LightDescription> {
    let mut attrs: Vec<&Attribute> = light
        .attributes()
        .filter(|a| !settings.is_excluded(a.name()))
        .filter(|a| a.num_samples() > 1)
        .collect();
    attrs.sort_by(|a, b| a.name().cmp(b.name()));

    let mut desc = LightDescription {
        usd_path: usd_path.to_string(),
        ..Default::default()
    };
    let times = unioned_sample_times(attrs.iter().copied());
    let (Some(first), Some(last)) = (times.first(), times.last()) else {
        return Ok(desc);
    };

    // rendering happens on whole frames, not on sample times
    let frames = FrameRange::new(first.value().floor() as i64, last.value().trunc() as i64)?;
    let groups = FrameGroupFinder::find(attrs.iter().copied(), frames)?;
    desc.frame_groups = groups.iter().filter_map(FrameGroup::to_description).collect();

    let mut varying = BTreeSet::new();
    let mut removed = BTreeSet::new();
    for group in &mut desc.frame_groups {
        if !group.varying_attr_name.is_empty() {
            varying.insert(group.varying_attr_name.clone());
        }
        group.non_default_constants.retain(|name, _| {
            let keep = !name.starts_with(XFORM_OP_PREFIX);
            if !keep {
                removed.insert(name.clone());
            }
            keep
        });
    }

    desc.attrs = attrs
        .iter()
        .map(|a| a.name().to_string())
        .filter(|name| !removed.contains(name) || varying.contains(name))
        .collect();
    desc.frames = Some(frames);
    Ok(desc)
}

/// Describe every light of a layer, keyed by light name.
///
/// A layer without lights is an error, as is a light name seen twice.
pub fn describe_layer(layer: &Layer, usd_path: &str, settings: &Settings, mode: ErrorMode) -> Result<Descriptions> {
    let lights: Vec<_> = layer
        .traverse()
        .filter_map(|(path, prim)| settings.light_name(prim.name()).map(|name| (path, name, prim)))
        .collect();
    if lights.is_empty() {
        return Err(Error::other(format!("layer had no lights: {usd_path}")));
    }

    let mut descriptions = Descriptions::new();
    for (path, name, prim) in lights {
        let result = if descriptions.contains_key(name) {
            Err(Error::DuplicateLight(name.to_string()))
        } else {
            describe_light(prim, usd_path, settings)
        };
        match result {
            Ok(desc) => {
                descriptions.insert(name.to_string(), desc);
            }
            Err(e) => mode.handle(e, format_args!("light {path} in {usd_path}"))?,
        }
    }
    Ok(descriptions)
}

/// Describe the lights of every `.usda` layer at `path` (a file or a
/// directory, searched recursively when `recurse` is set).
///
/// Layers are read in parallel. A light name found in two layers is an
/// error.
pub fn describe_paths(path: impl AsRef<Path>, recurse: bool, settings: &Settings, mode: ErrorMode) -> Result<Descriptions> {
    let path = path.as_ref();
    let layer_paths = find_layers(path, recurse)?;
    if layer_paths.is_empty() {
        return Err(Error::other(format!("could not find any layers at path: {}", path.display())));
    }

    let mut descriptions = Descriptions::new();
    for (layer_path, layer) in layer_paths.iter().zip(read_layers(&layer_paths[..])) {
        info!(path = %layer_path.display(), "describing lights");
        let usd_path = layer_path.display().to_string();
        let found = layer.and_then(|layer| describe_layer(&layer, &usd_path, settings, mode));
        let found = match found {
            Ok(found) => found,
            Err(e) => {
                mode.handle(e, &usd_path)?;
                continue;
            }
        };
        for (name, desc) in found {
            if descriptions.contains_key(&name) {
                mode.handle(Error::DuplicateLight(name), &usd_path)?;
                continue;
            }
            descriptions.insert(name, desc);
        }
    }
    info!(count = descriptions.len(), "described lights");
    Ok(descriptions)
}

/// Write descriptions as pretty JSON.
pub fn write_descriptions(path: impl AsRef<Path>, descriptions: &Descriptions) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(descriptions)?;
    std::fs::write(path, json).map_err(|e| Error::from(e).in_file(path))
}

/// Read descriptions written by [`write_descriptions`].
pub fn read_descriptions(path: impl AsRef<Path>) -> Result<Descriptions> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
    serde_json::from_str(&text).map_err(|e| Error::from(e).in_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeCode;
    use crate::util::{Value, ValueType};
    use serde_json::json;

    fn floats(name: &str, samples: &[(f64, f32)]) -> Attribute {
        Attribute::sampled(
            name,
            ValueType::FLOAT,
            samples.iter().map(|&(t, v)| (TimeCode::new(t).unwrap(), Value::Float(v))),
        )
        .unwrap()
    }

    fn rect_light() -> Prim {
        Prim::def("RectLight", "rect_light")
            .unwrap()
            .with_property(floats("inputs:intensity", &[(1.0, 1.0), (10.0, 1000.0)]))
            .with_property(floats("inputs:exposure", &[(1.0, 2.0), (10.0, 2.0)]))
            .with_property(floats("houdini:guidescale", &[(1.0, 1.0), (10.0, 5.0)]))
            .with_property(floats("inputs:width", &[(1.0, 3.0)]))
            .with_property(
                Attribute::sampled(
                    "xformOp:translate",
                    ValueType::DOUBLE3,
                    [
                        (TimeCode::from(1), Value::Double3(glam::DVec3::new(0.0, 2.0, 0.0))),
                        (TimeCode::from(10), Value::Double3(glam::DVec3::new(0.0, 2.0, 0.0))),
                    ],
                )
                .unwrap(),
            )
    }

    #[test]
    fn test_describe_light() {
        let desc = describe_light(&rect_light(), "rect.usda", &Settings::default()).unwrap();
        assert_eq!(desc.frames, Some(FrameRange::new(1, 10).unwrap()));
        // houdini namespace excluded, single-sample width skipped,
        // constant transform dropped
        assert_eq!(desc.attrs, vec!["inputs:exposure", "inputs:intensity"]);
        assert_eq!(desc.usd_path, "rect.usda");

        let last = desc.frame_groups.last().unwrap();
        assert_eq!(last.frames, FrameRange::new(9, 10).unwrap());
        assert_eq!(last.varying_attr_name, "inputs:intensity");
        assert_eq!(last.non_default_constants, BTreeMap::from([("inputs:exposure".to_string(), json!(2.0))]));
        assert_eq!(summarize_light("rect", &desc).lines().last(), Some("9-10: intensity from 1 to 1000 (exposure=2)"));
    }

    #[test]
    fn test_fractional_sample_frames() {
        let light = Prim::def("SphereLight", "sphere_light")
            .unwrap()
            .with_property(floats("inputs:radius", &[(0.5, 1.0), (3.75, 2.0)]));
        let desc = describe_light(&light, "s.usda", &Settings::default()).unwrap();
        assert_eq!(desc.frames, Some(FrameRange::new(0, 3).unwrap()));
    }

    #[test]
    fn test_unanimated_light() {
        let light = Prim::def("DomeLight", "dome_light").unwrap().with_property(floats("inputs:intensity", &[(1.0, 1.0)]));
        let desc = describe_light(&light, "d.usda", &Settings::default()).unwrap();
        assert_eq!(desc.frames, None);
        assert!(desc.attrs.is_empty());
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json, json!({"usd_path": "d.usda"}));
    }

    #[test]
    fn test_describe_layer() {
        let layer = Layer::new().with_prim(
            Prim::def("Scope", "lights")
                .unwrap()
                .with_child(rect_light())
                .with_child(Prim::def("Camera", "camera").unwrap()),
        );
        let found = describe_layer(&layer, "l.usda", &Settings::default(), ErrorMode::Raise).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["rect"]);

        let empty = Layer::new().with_prim(Prim::def("Camera", "camera").unwrap());
        assert!(describe_layer(&empty, "e.usda", &Settings::default(), ErrorMode::Raise).is_err());
    }

    #[test]
    fn test_duplicate_lights() {
        let layer = Layer::new()
            .with_prim(Prim::def("Scope", "a").unwrap().with_child(rect_light()))
            .with_prim(Prim::def("Scope", "b").unwrap().with_child(rect_light()));
        let err = describe_layer(&layer, "l.usda", &Settings::default(), ErrorMode::Raise).unwrap_err();
        assert!(matches!(err, Error::DuplicateLight(ref name) if name == "rect"));

        let found = describe_layer(&layer, "l.usda", &Settings::default(), ErrorMode::Warn).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_error_mode_parse() {
        assert_eq!("raise".parse::<ErrorMode>().unwrap(), ErrorMode::Raise);
        assert_eq!("warn".parse::<ErrorMode>().unwrap(), ErrorMode::Warn);
        assert!("ignore".parse::<ErrorMode>().is_err());
    }
}
