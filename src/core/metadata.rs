//! Metadata for layers, prims and properties.
//!
//! Metadata is an ordered list of `key = value` entries written inside a
//! parenthesized block. Values are untyped ([`MetaValue`]) except inside
//! dictionaries, whose entries carry a declared type ([`DictValue`]).

use super::SdfPath;
use crate::util::{Value, ValueType};
use smallvec::SmallVec;

/// List-editing operator in front of a metadata key or relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListOp {
    Add,
    Append,
    Delete,
    Prepend,
    Reorder,
}

impl ListOp {
    /// Keyword as written in a layer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Append => "append",
            Self::Delete => "delete",
            Self::Prepend => "prepend",
            Self::Reorder => "reorder",
        }
    }

    /// Parse a list-op keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "append" => Some(Self::Append),
            "delete" => Some(Self::Delete),
            "prepend" => Some(Self::Prepend),
            "reorder" => Some(Self::Reorder),
            _ => None,
        }
    }
}

/// Untyped metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Number(f64),
    String(String),
    /// Bare word such as `None`, `true` or `Y`.
    Ident(String),
    Asset(String),
    /// `@file@</prim>` reference.
    Reference { asset: String, prim: SdfPath },
    Path(SdfPath),
    List(Vec<MetaValue>),
    Tuple(Vec<MetaValue>),
    Dictionary(Dictionary),
}

impl MetaValue {
    /// Numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a string or identifier.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Dictionary contents, if this is a dictionary.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

/// One metadata entry.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaEntry {
    pub op: Option<ListOp>,
    pub key: String,
    pub value: MetaValue,
}

/// Ordered metadata storage.
///
/// Uses SmallVec optimization for the common case of few entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaData {
    entries: SmallVec<[MetaEntry; 2]>,
}

impl MetaData {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metadata value (no list op), replacing an existing entry in place.
    pub fn set(&mut self, key: impl Into<String>, value: MetaValue) {
        let key = key.into();
        for entry in &mut self.entries {
            if entry.key == key && entry.op.is_none() {
                entry.value = value;
                return;
            }
        }
        self.entries.push(MetaEntry { op: None, key, value });
    }

    /// Append an entry verbatim. List-op entries may repeat a key.
    pub fn push(&mut self, entry: MetaEntry) {
        self.entries.push(entry);
    }

    /// Get a plain (non list-op) value by key.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries
            .iter()
            .find(|e| e.key == key && e.op.is_none())
            .map(|e| &e.value)
    }

    /// Mutable access to a plain value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut MetaValue> {
        self.entries
            .iter_mut()
            .find(|e| e.key == key && e.op.is_none())
            .map(|e| &mut e.value)
    }

    /// Check if a key exists with any list op.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Remove the plain entry for a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        let pos = self.entries.iter().position(|e| e.key == key && e.op.is_none())?;
        Some(self.entries.remove(pos).value)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in authored order.
    pub fn iter(&self) -> impl Iterator<Item = &MetaEntry> {
        self.entries.iter()
    }

    // === Common metadata keys ===

    pub const DOC_KEY: &'static str = "doc";
    pub const KIND_KEY: &'static str = "kind";
    pub const CUSTOM_DATA_KEY: &'static str = "customData";

    /// Documentation string.
    pub fn doc(&self) -> Option<&str> {
        self.get(Self::DOC_KEY).and_then(MetaValue::as_str)
    }

    /// Model kind (`component`, `group`, ...).
    pub fn kind(&self) -> Option<&str> {
        self.get(Self::KIND_KEY).and_then(MetaValue::as_str)
    }

    /// `customData` dictionary.
    pub fn custom_data(&self) -> Option<&Dictionary> {
        self.get(Self::CUSTOM_DATA_KEY).and_then(MetaValue::as_dictionary)
    }
}

impl FromIterator<(String, MetaValue)> for MetaData {
    fn from_iter<T: IntoIterator<Item = (String, MetaValue)>>(iter: T) -> Self {
        let mut meta = Self::new();
        for (k, v) in iter {
            meta.set(k, v);
        }
        meta
    }
}

/// Dictionary entry value.
#[derive(Clone, Debug, PartialEq)]
pub enum DictValue {
    Typed { ty: ValueType, value: Value },
    Dictionary(Dictionary),
}

/// Ordered dictionary (`customLayerData`, `customData`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, DictValue)>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: DictValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&DictValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable entry by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut DictValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Follow nested dictionaries along `keys`.
    pub fn get_path<S: AsRef<str>>(&self, keys: &[S]) -> Option<&DictValue> {
        let (last, parents) = keys.split_last()?;
        let mut dict = self;
        for key in parents {
            match dict.get(key.as_ref())? {
                DictValue::Dictionary(d) => dict = d,
                DictValue::Typed { .. } => return None,
            }
        }
        dict.get(last.as_ref())
    }

    /// Typed value at a nested key path.
    pub fn value_at<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Value> {
        match self.get_path(keys)? {
            DictValue::Typed { value, .. } => Some(value),
            DictValue::Dictionary(_) => None,
        }
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<DictValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in authored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DictValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_basic() {
        let mut meta = MetaData::new();
        meta.set("kind", MetaValue::String("component".into()));
        meta.set("doc", MetaValue::String("rect light".into()));

        assert_eq!(meta.kind(), Some("component"));
        assert_eq!(meta.doc(), Some("rect light"));
        assert_eq!(meta.get("active"), None);
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_metadata_update_in_place() {
        let mut meta = MetaData::new();
        meta.set("startTimeCode", MetaValue::Number(1.0));
        meta.set("endTimeCode", MetaValue::Number(10.0));
        meta.set("startTimeCode", MetaValue::Number(5.0));

        let keys: Vec<&str> = meta.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["startTimeCode", "endTimeCode"]);
        assert_eq!(meta.get("startTimeCode").and_then(MetaValue::as_f64), Some(5.0));
    }

    #[test]
    fn test_list_op_entries_are_separate() {
        let mut meta = MetaData::new();
        meta.push(MetaEntry {
            op: Some(ListOp::Prepend),
            key: "apiSchemas".into(),
            value: MetaValue::List(vec![MetaValue::String("ShapingAPI".into())]),
        });
        assert!(meta.contains("apiSchemas"));
        assert_eq!(meta.get("apiSchemas"), None);
        assert_eq!(ListOp::from_keyword("prepend"), Some(ListOp::Prepend));
    }

    #[test]
    fn test_dictionary_paths() {
        let mut capture = Dictionary::new();
        capture.insert("capture_frame_end", DictValue::Typed { ty: ValueType::INT, value: Value::Int(31) });
        let mut root = Dictionary::new();
        root.insert("MovieCaptureSettings", DictValue::Dictionary(capture));

        assert_eq!(
            root.value_at(&["MovieCaptureSettings", "capture_frame_end"]),
            Some(&Value::Int(31))
        );
        assert_eq!(root.value_at(&["MovieCaptureSettings"]), None);
        assert_eq!(root.get_path(&["missing", "x"]), None);
    }
}
