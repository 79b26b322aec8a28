//! Schema fallback values for UsdLux light attributes.
//!
//! An attribute that resolves to its fallback is reported as a "default"
//! rather than a non-default constant in light descriptions.

use crate::util::{BaseType, ValueType};
use serde_json::{json, Value as Json};

/// Fallback of a known light attribute, as JSON.
fn known_fallback(name: &str) -> Option<Json> {
    let value = match name {
        "inputs:intensity" => json!(1.0),
        "inputs:exposure" => json!(0.0),
        "inputs:color" => json!([1.0, 1.0, 1.0]),
        "inputs:enableColorTemperature" => json!(false),
        "inputs:colorTemperature" => json!(6500.0),
        "inputs:normalize" => json!(false),
        "inputs:diffuse" => json!(1.0),
        "inputs:specular" => json!(1.0),
        "inputs:radius" => json!(0.5),
        "inputs:width" => json!(1.0),
        "inputs:height" => json!(1.0),
        "inputs:length" => json!(1.0),
        "inputs:angle" => json!(0.53),
        "inputs:texture:file" => json!(""),
        "inputs:texture:format" => json!("automatic"),
        "inputs:shaping:focus" => json!(0.0),
        "inputs:shaping:focusTint" => json!([0.0, 0.0, 0.0]),
        "inputs:shaping:cone:angle" => json!(90.0),
        "inputs:shaping:cone:softness" => json!(0.0),
        "inputs:shaping:ies:file" => json!(""),
        "inputs:shaping:ies:angleScale" => json!(0.0),
        "inputs:shaping:ies:normalize" => json!(false),
        "treatAsLine" => json!(false),
        "treatAsPoint" => json!(false),
        _ => return None,
    };
    Some(value)
}

/// Fallback for an attribute of type `ty`.
///
/// Known light inputs use their schema fallback. Other math types fall back
/// to their default construction (zero vectors, identity matrices) and
/// assets to an empty path; anything else has no fallback (`null`).
pub fn fallback_value(name: &str, ty: ValueType) -> Json {
    if let Some(value) = known_fallback(name) {
        return value;
    }
    if ty.array {
        return Json::Null;
    }
    let storage = ty.storage();
    match ty.base {
        BaseType::Matrix4d => json!([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0]
        ]),
        BaseType::Asset => json!(""),
        _ if storage.is_floating() && storage.components() > 1 => Json::Array(vec![json!(0.0); storage.components()]),
        _ => Json::Null,
    }
}
