//! One-line text summaries of light frame groups.
//!
//! ```text
//! 1-10: intensity from 1 to 1000 (exposure=2)
//! 11: (constant)
//! ```

use super::{FrameGroupDesc, LightDescription};
use crate::core::FrameRange;
use crate::util::is_close;
use serde_json::Value as Json;
use std::collections::{BTreeMap, BTreeSet};

/// Hand-written summaries replacing the generated ones for a light.
///
/// A group whose frames fall inside an override range is reported once,
/// with the override's text and frames.
pub const SUMMARY_OVERRIDES: &[(&str, FrameRange, &str)] = &[
    ("distant", FrameRange { start: 21, end: 25 }, "cam rotate from 0 to 80 (intensity 3720)"),
    ("distant", FrameRange { start: 26, end: 30 }, "light rotate from 0 to 80 (intensity 3720)"),
];

fn find_summary_override(light_name: &str, frames: FrameRange) -> Option<(FrameRange, &'static str)> {
    SUMMARY_OVERRIDES
        .iter()
        .find(|(name, range, _)| *name == light_name && range.is_superset(&frames))
        .map(|&(_, range, desc)| (range, desc))
}

/// Compact value text: whole floats lose their fraction, other floats keep
/// one digit without a leading zero, relative path prefixes are dropped from
/// strings, bools read `on`/`off`.
pub fn format_val(val: &Json) -> String {
    match val {
        Json::Number(n) if n.is_f64() => {
            let v = n.as_f64().unwrap_or_default();
            if is_close(v, v.trunc()) {
                format!("{}", v.trunc() as i64)
            } else {
                let text = format!("{v:.1}");
                text.trim_start_matches('0').to_string()
            }
        }
        Json::String(s) => {
            let parts: Vec<&str> = s.split('/').skip_while(|p| *p == "." || *p == "..").collect();
            py_repr_str(&parts.join("/"))
        }
        Json::Bool(b) => (if *b { "on" } else { "off" }).to_string(),
        other => py_repr(other),
    }
}

/// Attribute name without the `inputs:` and `shaping:` namespaces.
pub fn format_attr(attr_name: &str) -> &str {
    let name = attr_name.strip_prefix("inputs:").unwrap_or(attr_name);
    name.strip_prefix("shaping:").unwrap_or(name)
}

/// Summary text for each group, keyed by start frame.
pub fn group_summaries(light_name: &str, desc: &LightDescription) -> BTreeMap<i64, String> {
    let mut summaries = BTreeMap::new();
    let mut printed_overrides = BTreeSet::new();
    for group in &desc.frame_groups {
        let (frames, text) = match find_summary_override(light_name, group.frames) {
            Some((range, _)) if printed_overrides.contains(&range) => continue,
            Some((range, text)) => {
                printed_overrides.insert(range);
                (range, text.to_string())
            }
            None => (group.frames, group_text(group)),
        };
        summaries.insert(frames.start, format!("{}: {text}", frames.display_str()));
    }
    summaries
}

fn group_text(group: &FrameGroupDesc) -> String {
    if group.varying_attr_name.is_empty() {
        return "(constant)".to_string();
    }
    let val_at = |frame: i64| group.varying_vals.get(&frame).unwrap_or(&Json::Null);
    let mut text = format!(
        "{} from {} to {}",
        format_attr(&group.varying_attr_name),
        format_val(val_at(group.frames.start)),
        format_val(val_at(group.frames.end)),
    );
    if !group.non_default_constants.is_empty() {
        let constants: Vec<String> = group
            .non_default_constants
            .iter()
            .map(|(name, val)| format!("{}={}", format_attr(name), format_val(val)))
            .collect();
        text.push_str(&format!(" ({})", constants.join(", ")));
    }
    text
}

/// All group summaries of a light, one per line.
pub fn summarize_light(light_name: &str, desc: &LightDescription) -> String {
    group_summaries(light_name, desc)
        .into_values()
        .collect::<Vec<_>>()
        .join("\n")
}

fn py_repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python-style literal text for lists and other nested values.
fn py_repr(val: &Json) -> String {
    match val {
        Json::Null => "None".to_string(),
        Json::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Json::Number(n) => match n.as_f64() {
            Some(v) if n.is_f64() && v.fract() == 0.0 && v.is_finite() => format!("{v:.1}"),
            _ => n.to_string(),
        },
        Json::String(s) => py_repr_str(s),
        Json::Array(items) => {
            let parts: Vec<String> = items.iter().map(py_repr).collect();
            format!("[{}]", parts.join(", "))
        }
        Json::Object(map) => {
            let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", py_repr_str(k), py_repr(v))).collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(start: i64, end: i64, varying: &str, vals: &[(i64, Json)], constants: &[(&str, Json)]) -> FrameGroupDesc {
        FrameGroupDesc {
            frames: FrameRange::new(start, end).unwrap(),
            varying_attr_name: varying.to_string(),
            varying_vals: vals.iter().cloned().collect(),
            non_default_constants: constants.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        }
    }

    #[test]
    fn test_format_val() {
        assert_eq!(format_val(&json!(1000.0)), "1000");
        assert_eq!(format_val(&json!(0.3)), ".3");
        assert_eq!(format_val(&json!(2.76)), "2.8");
        assert_eq!(format_val(&json!(-0.5)), "-0.5");
        assert_eq!(format_val(&json!(3)), "3");
        assert_eq!(format_val(&json!(true)), "on");
        assert_eq!(format_val(&json!(false)), "off");
        assert_eq!(format_val(&json!("./../textures/sky.exr")), "'textures/sky.exr'");
        assert_eq!(format_val(&json!([1.0, 0.5, 0])), "[1.0, 0.5, 0]");
    }

    #[test]
    fn test_format_attr() {
        assert_eq!(format_attr("inputs:intensity"), "intensity");
        assert_eq!(format_attr("inputs:shaping:cone:angle"), "cone:angle");
        assert_eq!(format_attr("xformOp:rotateXYZ"), "xformOp:rotateXYZ");
    }

    #[test]
    fn test_summarize() {
        let desc = LightDescription {
            frame_groups: vec![
                group(
                    1,
                    10,
                    "inputs:intensity",
                    &[(1, json!(1.0)), (10, json!(1000.0))],
                    &[("inputs:exposure", json!(2.0))],
                ),
                group(11, 11, "", &[], &[]),
            ],
            ..Default::default()
        };
        assert_eq!(
            summarize_light("rect", &desc),
            "1-10: intensity from 1 to 1000 (exposure=2)\n11: (constant)"
        );
    }

    #[test]
    fn test_summary_overrides() {
        let desc = LightDescription {
            frame_groups: vec![
                group(20, 20, "", &[], &[]),
                group(21, 22, "xformOp:rotateXYZ", &[(21, json!(0.0)), (22, json!(20.0))], &[]),
                group(23, 25, "xformOp:rotateXYZ", &[(23, json!(40.0)), (25, json!(80.0))], &[]),
                group(26, 30, "xformOp:rotateXYZ", &[(26, json!(0.0)), (30, json!(80.0))], &[]),
            ],
            ..Default::default()
        };
        let summaries: Vec<String> = group_summaries("distant", &desc).into_values().collect();
        assert_eq!(
            summaries,
            vec![
                "20: (constant)",
                "21-25: cam rotate from 0 to 80 (intensity 3720)",
                "26-30: light rotate from 0 to 80 (intensity 3720)",
            ]
        );
        // other lights are unaffected
        assert!(summarize_light("rect", &desc).contains("21-22: xformOp:rotateXYZ from 0 to 20"));
    }
}
