//! Frame groups: spans of frames over which one attribute varies.
//!
//! Frames are walked in order. Each frame starts as a single-frame group
//! and is folded into the previous group when exactly one attribute changed
//! between them, in the same direction as the group's existing variation.

use super::fallback::fallback_value;
use crate::core::{Attribute, FrameRange};
use crate::util::{is_close, Result, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Attribute values at one frame, by attribute name.
pub type FrameVals = BTreeMap<String, Json>;

/// Loose equality used to detect changes between frames.
///
/// Numbers compare with [`is_close`]; arrays compare element-wise.
pub fn vals_close(a: &Json, b: &Json) -> bool {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => is_close(x, y),
            _ => x == y,
        },
        (Json::Array(xs), Json::Array(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| vals_close(x, y)),
        _ => a == b,
    }
}

/// Ordering of two values of the same kind; arrays compare lexicographically.
pub fn json_cmp(a: &Json, b: &Json) -> Option<Ordering> {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Json::String(x), Json::String(y)) => Some(x.cmp(y)),
        (Json::Bool(x), Json::Bool(y)) => Some(x.cmp(y)),
        (Json::Array(xs), Json::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                match json_cmp(x, y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(xs.len().cmp(&ys.len()))
        }
        (Json::Null, Json::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Frames sharing one varying attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGroup {
    frame_vals: BTreeMap<i64, FrameVals>,
    /// The one varying attribute; None for single-frame groups.
    varying: Option<String>,
    increasing: bool,
    /// Constant, not at fallback.
    constants: BTreeSet<String>,
    /// Constant and at fallback.
    defaults: BTreeSet<String>,
}

impl FrameGroup {
    /// Single-frame group. Values matching `fallbacks` count as defaults.
    pub fn for_frame(frame: i64, vals: FrameVals, fallbacks: &FrameVals) -> Self {
        let mut constants = BTreeSet::new();
        let mut defaults = BTreeSet::new();
        for (name, val) in &vals {
            let fallback = fallbacks.get(name).unwrap_or(&Json::Null);
            if vals_close(val, fallback) {
                defaults.insert(name.clone());
            } else {
                constants.insert(name.clone());
            }
        }
        Self {
            frame_vals: BTreeMap::from([(frame, vals)]),
            varying: None,
            increasing: true,
            constants,
            defaults,
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.frame_vals.keys().copied()
    }

    pub fn frame_range(&self) -> Option<FrameRange> {
        let start = *self.frame_vals.keys().next()?;
        let end = *self.frame_vals.keys().next_back()?;
        Some(FrameRange { start, end })
    }

    pub fn varying(&self) -> Option<&str> {
        self.varying.as_deref()
    }

    pub fn is_increasing(&self) -> bool {
        self.increasing
    }

    pub fn constants(&self) -> &BTreeSet<String> {
        &self.constants
    }

    pub fn defaults(&self) -> &BTreeSet<String> {
        &self.defaults
    }

    /// Attributes whose value differs between the last frame here and the
    /// first frame of `other`, with whether each one went up.
    fn changed_attrs(&self, other: &FrameGroup) -> Vec<(String, bool)> {
        let (Some((_, this_vals)), Some((_, other_vals))) =
            (self.frame_vals.last_key_value(), other.frame_vals.first_key_value())
        else {
            return Vec::new();
        };
        this_vals
            .iter()
            .filter_map(|(name, old)| {
                let new = other_vals.get(name).unwrap_or(&Json::Null);
                if vals_close(old, new) {
                    None
                } else {
                    Some((name.clone(), json_cmp(new, old) == Some(Ordering::Greater)))
                }
            })
            .collect()
    }

    /// Fold the single-frame group `other`, which must come after every
    /// frame here, into this group.
    ///
    /// Returns false, leaving this group untouched, when the frames differ
    /// in more than one attribute, in none, or in a different attribute or
    /// direction than this group already varies.
    pub fn combine(&mut self, other: &FrameGroup) -> bool {
        debug_assert_eq!(other.frame_vals.len(), 1);
        let Some((&frame, vals)) = other.frame_vals.first_key_value() else {
            return false;
        };
        if self.frame_vals.keys().next_back().is_some_and(|&last| last >= frame) {
            return false;
        }

        let changed = self.changed_attrs(other);
        let [(name, increasing)] = changed.as_slice() else {
            return false;
        };
        match &self.varying {
            None => {
                if !self.constants.remove(name) && !self.defaults.remove(name) {
                    return false;
                }
                self.varying = Some(name.clone());
                self.increasing = *increasing;
            }
            Some(varying) if varying == name && self.increasing == *increasing => {}
            Some(_) => return false,
        }
        self.frame_vals.insert(frame, vals.clone());
        true
    }

    /// Serializable summary of the group.
    pub fn to_description(&self) -> Option<FrameGroupDesc> {
        let frames = self.frame_range()?;
        let varying_vals = match &self.varying {
            Some(name) => self
                .frame_vals
                .iter()
                .filter_map(|(&frame, vals)| vals.get(name).map(|v| (frame, v.clone())))
                .collect(),
            None => BTreeMap::new(),
        };
        // constants hold the same value on every frame
        let first = self.frame_vals.values().next()?;
        let non_default_constants = self
            .constants
            .iter()
            .filter_map(|name| first.get(name).map(|v| (name.clone(), v.clone())))
            .collect();
        Some(FrameGroupDesc {
            frames,
            varying_attr_name: self.varying.clone().unwrap_or_default(),
            varying_vals,
            non_default_constants,
        })
    }
}

/// A frame group as written to light description JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameGroupDesc {
    pub frames: FrameRange,
    /// Empty for single-frame groups.
    pub varying_attr_name: String,
    pub varying_vals: BTreeMap<i64, Json>,
    pub non_default_constants: BTreeMap<String, Json>,
}

/// Splits a frame range into frame groups for a set of attributes.
pub struct FrameGroupFinder<'a> {
    attrs: Vec<&'a Attribute>,
    fallbacks: FrameVals,
    groups: Vec<FrameGroup>,
}

impl<'a> FrameGroupFinder<'a> {
    pub fn new(attrs: impl IntoIterator<Item = &'a Attribute>) -> Self {
        let attrs: Vec<&Attribute> = attrs.into_iter().collect();
        let fallbacks = attrs
            .iter()
            .map(|attr| (attr.name().to_string(), attr_fallback(attr)))
            .collect();
        Self {
            attrs,
            fallbacks,
            groups: Vec::new(),
        }
    }

    /// Frame groups covering `frames`, in frame order.
    pub fn find(
        attrs: impl IntoIterator<Item = &'a Attribute>,
        frames: FrameRange,
    ) -> Result<Vec<FrameGroup>> {
        let mut finder = Self::new(attrs);
        for frame in frames.iter_frames() {
            finder.add_frame(frame)?;
        }
        Ok(finder.groups)
    }

    fn add_frame(&mut self, frame: i64) -> Result<()> {
        let mut vals = FrameVals::new();
        for attr in &self.attrs {
            vals.insert(attr.name().to_string(), attr.get(frame as f64)?.to_json());
        }
        let group = FrameGroup::for_frame(frame, vals, &self.fallbacks);
        let combined = self.groups.last_mut().is_some_and(|last| last.combine(&group));
        if !combined {
            self.groups.push(group);
        }
        Ok(())
    }
}

/// Fallback of `attr` as it would read back through the attribute's type,
/// so `float` fallbacks compare at single precision.
fn attr_fallback(attr: &Attribute) -> Json {
    let fallback = fallback_value(attr.name(), attr.value_type());
    if fallback.is_null() {
        return fallback;
    }
    Value::from_json(attr.value_type(), &fallback)
        .map(|v| v.to_json())
        .unwrap_or(fallback)
}
