//! ValueType - the declared type of an attribute.
//!
//! A [`ValueType`] pairs a [`BaseType`] (the type token written in the layer,
//! e.g. `color3f`) with an array flag (`color3f[]`). Several base types share
//! one in-memory [`Storage`]: `color3f`, `vector3f` and `point3f` are all
//! stored as a `Vec3`, but keep their role so they serialize back unchanged.

use super::Value;
use std::fmt;

/// In-memory representation shared by one or more [`BaseType`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    Bool,
    Int,
    UInt,
    Int64,
    Float,
    Double,
    Float2,
    Float3,
    Float4,
    Double2,
    Double3,
    Double4,
    Matrix4d,
    Token,
    String,
    Asset,
}

impl Storage {
    /// Number of scalar components (1 for scalars, 16 for matrices).
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Float2 | Self::Double2 => 2,
            Self::Float3 | Self::Double3 => 3,
            Self::Float4 | Self::Double4 => 4,
            Self::Matrix4d => 16,
            _ => 1,
        }
    }

    /// True for the floating point families (scalar, tuple and matrix).
    #[inline]
    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            Self::Float
                | Self::Double
                | Self::Float2
                | Self::Float3
                | Self::Float4
                | Self::Double2
                | Self::Double3
                | Self::Double4
                | Self::Matrix4d
        )
    }

    /// True for the text families (token, string, asset).
    #[inline]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Token | Self::String | Self::Asset)
    }
}

/// Attribute type token as written in a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Bool,
    Int,
    UInt,
    Int64,
    Float,
    Double,
    TimeCode,
    Float2,
    Float3,
    Float4,
    Double2,
    Double3,
    Double4,
    Color3f,
    Color3d,
    Color4f,
    Vector3f,
    Vector3d,
    Point3f,
    Point3d,
    Normal3f,
    Normal3d,
    TexCoord2f,
    Matrix4d,
    Token,
    String,
    Asset,
}

impl BaseType {
    /// Every recognized base type.
    pub const ALL: [BaseType; 27] = [
        Self::Bool,
        Self::Int,
        Self::UInt,
        Self::Int64,
        Self::Float,
        Self::Double,
        Self::TimeCode,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Double2,
        Self::Double3,
        Self::Double4,
        Self::Color3f,
        Self::Color3d,
        Self::Color4f,
        Self::Vector3f,
        Self::Vector3d,
        Self::Point3f,
        Self::Point3d,
        Self::Normal3f,
        Self::Normal3d,
        Self::TexCoord2f,
        Self::Matrix4d,
        Self::Token,
        Self::String,
        Self::Asset,
    ];

    /// Type token as it appears in a layer.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::TimeCode => "timecode",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Double2 => "double2",
            Self::Double3 => "double3",
            Self::Double4 => "double4",
            Self::Color3f => "color3f",
            Self::Color3d => "color3d",
            Self::Color4f => "color4f",
            Self::Vector3f => "vector3f",
            Self::Vector3d => "vector3d",
            Self::Point3f => "point3f",
            Self::Point3d => "point3d",
            Self::Normal3f => "normal3f",
            Self::Normal3d => "normal3d",
            Self::TexCoord2f => "texCoord2f",
            Self::Matrix4d => "matrix4d",
            Self::Token => "token",
            Self::String => "string",
            Self::Asset => "asset",
        }
    }

    /// Parse a type token. Returns None for unrecognized tokens.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// In-memory storage for this type.
    pub const fn storage(self) -> Storage {
        match self {
            Self::Bool => Storage::Bool,
            Self::Int => Storage::Int,
            Self::UInt => Storage::UInt,
            Self::Int64 => Storage::Int64,
            Self::Float => Storage::Float,
            Self::Double | Self::TimeCode => Storage::Double,
            Self::Float2 | Self::TexCoord2f => Storage::Float2,
            Self::Float3 | Self::Color3f | Self::Vector3f | Self::Point3f | Self::Normal3f => {
                Storage::Float3
            }
            Self::Float4 | Self::Color4f => Storage::Float4,
            Self::Double2 => Storage::Double2,
            Self::Double3 | Self::Color3d | Self::Vector3d | Self::Point3d | Self::Normal3d => {
                Storage::Double3
            }
            Self::Double4 => Storage::Double4,
            Self::Matrix4d => Storage::Matrix4d,
            Self::Token => Storage::Token,
            Self::String => Storage::String,
            Self::Asset => Storage::Asset,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of an attribute: a base type, optionally as an array.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    /// The element type
    pub base: BaseType,
    /// True for `type[]`
    pub array: bool,
}

impl ValueType {
    /// Create a scalar (non-array) type.
    #[inline]
    pub const fn scalar(base: BaseType) -> Self {
        Self { base, array: false }
    }

    /// Create an array type.
    #[inline]
    pub const fn array(base: BaseType) -> Self {
        Self { base, array: true }
    }

    /// Parse a full type token such as `float` or `token[]`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.strip_suffix("[]") {
            Some(base) => BaseType::from_name(base).map(Self::array),
            None => BaseType::from_name(name).map(Self::scalar),
        }
    }

    /// Element storage.
    #[inline]
    pub const fn storage(&self) -> Storage {
        self.base.storage()
    }

    /// Check whether `value` is a legal value of this type.
    pub fn conforms(&self, value: &Value) -> bool {
        let storage = self.storage();
        match value {
            Value::Array(items) if self.array => {
                items.iter().all(|v| v.storage() == Some(storage))
            }
            Value::Array(_) => false,
            scalar if !self.array => scalar.storage() == Some(storage),
            _ => false,
        }
    }

    // === Common predefined types ===

    pub const BOOL: Self = Self::scalar(BaseType::Bool);
    pub const INT: Self = Self::scalar(BaseType::Int);
    pub const FLOAT: Self = Self::scalar(BaseType::Float);
    pub const DOUBLE: Self = Self::scalar(BaseType::Double);
    pub const FLOAT3: Self = Self::scalar(BaseType::Float3);
    pub const DOUBLE3: Self = Self::scalar(BaseType::Double3);
    pub const COLOR3F: Self = Self::scalar(BaseType::Color3f);
    pub const MATRIX4D: Self = Self::scalar(BaseType::Matrix4d);
    pub const TOKEN: Self = Self::scalar(BaseType::Token);
    pub const TOKEN_ARRAY: Self = Self::array(BaseType::Token);
    pub const STRING: Self = Self::scalar(BaseType::String);
    pub const ASSET: Self = Self::scalar(BaseType::Asset);
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "{}[]", self.base.name())
        } else {
            f.write_str(self.base.name())
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<BaseType> for ValueType {
    fn from(base: BaseType) -> Self {
        Self::scalar(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_type_names() {
        for base in BaseType::ALL {
            assert_eq!(BaseType::from_name(base.name()), Some(base));
        }
        assert_eq!(ValueType::from_name("token[]"), Some(ValueType::TOKEN_ARRAY));
        assert_eq!(ValueType::from_name("texCoord2f").map(|t| t.base), Some(BaseType::TexCoord2f));
        assert_eq!(ValueType::from_name("half"), None);
        assert_eq!(ValueType::from_name("float[][]"), None);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(ValueType::COLOR3F.to_string(), "color3f");
        assert_eq!(ValueType::array(BaseType::Asset).to_string(), "asset[]");
    }

    #[test]
    fn test_conformance() {
        assert!(ValueType::DOUBLE.conforms(&Value::Double(1.0)));
        assert!(!ValueType::DOUBLE.conforms(&Value::Float(1.0)));
        assert!(!ValueType::DOUBLE.conforms(&Value::String("hello".into())));
        assert!(ValueType::COLOR3F.conforms(&Value::Float3(Vec3::ONE)));
        assert!(ValueType::scalar(BaseType::TimeCode).conforms(&Value::Double(3.0)));

        let tokens = Value::Array(vec![Value::Token("xformOp:transform".into())]);
        assert!(ValueType::TOKEN_ARRAY.conforms(&tokens));
        assert!(!ValueType::TOKEN.conforms(&tokens));
        assert!(!ValueType::TOKEN_ARRAY.conforms(&Value::Token("a".into())));
        assert!(ValueType::TOKEN_ARRAY.conforms(&Value::Array(Vec::new())));
    }
}
