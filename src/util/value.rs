//! Attribute values.
//!
//! [`Value`] is the in-memory form of one attribute value (or one time
//! sample). Tuple types use `glam` vectors; `matrix4d` is a [`DMat4`] whose
//! columns hold the rows as written in the layer (USD row-vector layout maps
//! directly onto glam's column storage).

use super::{Error, Result, Storage, ValueType};
use glam::{DMat4, DVec2, DVec3, DVec4, Vec2, Vec3, Vec4};
use serde_json::Value as Json;

/// A single typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Double2(DVec2),
    Double3(DVec3),
    Double4(DVec4),
    Matrix4d(DMat4),
    Token(String),
    String(String),
    /// Asset path, without the surrounding `@`.
    Asset(String),
    Array(Vec<Value>),
}

impl Value {
    /// Storage of a scalar value; None for arrays.
    pub fn storage(&self) -> Option<Storage> {
        Some(match self {
            Self::Bool(_) => Storage::Bool,
            Self::Int(_) => Storage::Int,
            Self::UInt(_) => Storage::UInt,
            Self::Int64(_) => Storage::Int64,
            Self::Float(_) => Storage::Float,
            Self::Double(_) => Storage::Double,
            Self::Float2(_) => Storage::Float2,
            Self::Float3(_) => Storage::Float3,
            Self::Float4(_) => Storage::Float4,
            Self::Double2(_) => Storage::Double2,
            Self::Double3(_) => Storage::Double3,
            Self::Double4(_) => Storage::Double4,
            Self::Matrix4d(_) => Storage::Matrix4d,
            Self::Token(_) => Storage::Token,
            Self::String(_) => Storage::String,
            Self::Asset(_) => Storage::Asset,
            Self::Array(_) => return None,
        })
    }

    /// Short name of the value's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Int64(_) => "int64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Float2(_) => "float2",
            Self::Float3(_) => "float3",
            Self::Float4(_) => "float4",
            Self::Double2(_) => "double2",
            Self::Double3(_) => "double3",
            Self::Double4(_) => "double4",
            Self::Matrix4d(_) => "matrix4d",
            Self::Token(_) => "token",
            Self::String(_) => "string",
            Self::Asset(_) => "asset",
            Self::Array(_) => "array",
        }
    }

    /// Numeric value of a scalar, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            Self::Int64(v) => Some(v as f64),
            Self::Float(v) => Some(v as f64),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Text of a token, string or asset.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Token(s) | Self::String(s) | Self::Asset(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Json {
        fn num(v: f64) -> Json {
            serde_json::Number::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
        }
        fn nums(vs: &[f64]) -> Json {
            Json::Array(vs.iter().copied().map(num).collect())
        }
        match self {
            Self::Bool(v) => Json::Bool(*v),
            Self::Int(v) => Json::from(*v),
            Self::UInt(v) => Json::from(*v),
            Self::Int64(v) => Json::from(*v),
            Self::Float(v) => num(*v as f64),
            Self::Double(v) => num(*v),
            Self::Float2(v) => nums(&v.as_dvec2().to_array()),
            Self::Float3(v) => nums(&v.as_dvec3().to_array()),
            Self::Float4(v) => nums(&v.as_dvec4().to_array()),
            Self::Double2(v) => nums(&v.to_array()),
            Self::Double3(v) => nums(&v.to_array()),
            Self::Double4(v) => nums(&v.to_array()),
            Self::Matrix4d(m) => Json::Array(m.to_cols_array_2d().iter().map(|row| nums(row)).collect()),
            Self::Token(s) | Self::String(s) | Self::Asset(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Build a value of type `ty` from JSON.
    ///
    /// JSON does not distinguish integers from floats, so any JSON number is
    /// accepted for floating point types; integer types require integral
    /// numbers in range.
    pub fn from_json(ty: ValueType, json: &Json) -> Result<Self> {
        if ty.array {
            let items = json
                .as_array()
                .ok_or_else(|| Error::mismatch(ty, json_kind(json)))?;
            return items
                .iter()
                .map(|item| scalar_from_json(ty.storage(), item).map_err(|_| Error::mismatch(ty, json_kind(item))))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array);
        }
        scalar_from_json(ty.storage(), json).map_err(|_| Error::mismatch(ty, json_kind(json)))
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn json_floats<const N: usize>(json: &Json) -> Option<[f64; N]> {
    let items = json.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(out)
}

fn scalar_from_json(storage: Storage, json: &Json) -> std::result::Result<Value, ()> {
    let value = match storage {
        Storage::Bool => Value::Bool(json.as_bool().ok_or(())?),
        Storage::Int => Value::Int(json.as_i64().and_then(|v| i32::try_from(v).ok()).ok_or(())?),
        Storage::UInt => Value::UInt(json.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or(())?),
        Storage::Int64 => Value::Int64(json.as_i64().ok_or(())?),
        Storage::Float => Value::Float(json.as_f64().ok_or(())? as f32),
        Storage::Double => Value::Double(json.as_f64().ok_or(())?),
        Storage::Float2 => Value::Float2(DVec2::from_array(json_floats(json).ok_or(())?).as_vec2()),
        Storage::Float3 => Value::Float3(DVec3::from_array(json_floats(json).ok_or(())?).as_vec3()),
        Storage::Float4 => Value::Float4(DVec4::from_array(json_floats(json).ok_or(())?).as_vec4()),
        Storage::Double2 => Value::Double2(DVec2::from_array(json_floats(json).ok_or(())?)),
        Storage::Double3 => Value::Double3(DVec3::from_array(json_floats(json).ok_or(())?)),
        Storage::Double4 => Value::Double4(DVec4::from_array(json_floats(json).ok_or(())?)),
        Storage::Matrix4d => {
            let rows = json.as_array().filter(|rows| rows.len() == 4).ok_or(())?;
            let mut cols = [[0.0; 4]; 4];
            for (col, row) in cols.iter_mut().zip(rows) {
                *col = json_floats(row).ok_or(())?;
            }
            Value::Matrix4d(DMat4::from_cols_array_2d(&cols))
        }
        Storage::Token => Value::Token(json.as_str().ok_or(())?.to_string()),
        Storage::String => Value::String(json.as_str().ok_or(())?.to_string()),
        Storage::Asset => Value::Asset(json.as_str().ok_or(())?.to_string()),
    };
    Ok(value)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Float3(v)
    }
}

impl From<DVec3> for Value {
    fn from(v: DVec3) -> Self {
        Self::Double3(v)
    }
}

impl From<DMat4> for Value {
    fn from(m: DMat4) -> Self {
        Self::Matrix4d(m)
    }
}
