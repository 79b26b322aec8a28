//! Scene paths (`/lights/rect_light`, `/lights/rect_light.inputs:intensity`).

use crate::util::{Error, Result};
use std::fmt;

/// A prim or property path as written between `<` and `>`.
///
/// Paths are stored verbatim. Absolute prim paths are validated when built
/// through [`SdfPath::new`]; relationship targets parsed from a layer are
/// kept as-is, since they are only resolved by consumers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SdfPath(String);

impl SdfPath {
    /// The absolute root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute prim or property path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(path));
        }
        if path == "/" {
            return Ok(Self(path));
        }
        let (prim_part, prop) = match path.split_once('.') {
            Some((prim, prop)) => (prim, Some(prop)),
            None => (path.as_str(), None),
        };
        let prim_ok = prim_part[1..].split('/').all(is_prim_name);
        let prop_ok = prop.map_or(true, is_property_name);
        if !prim_ok || !prop_ok {
            return Err(Error::InvalidPath(path));
        }
        Ok(Self(path))
    }

    /// Wrap text from a layer without validation.
    pub(crate) fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// True for a path with a `.property` part.
    pub fn is_property(&self) -> bool {
        self.0.contains('.')
    }

    /// Prim path part (the path itself for prim paths).
    pub fn prim_path(&self) -> SdfPath {
        match self.0.split_once('.') {
            Some((prim, _)) => Self(prim.to_string()),
            None => self.clone(),
        }
    }

    /// Property name, if this is a property path.
    pub fn property_name(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, prop)| prop)
    }

    /// Prim names from the root down.
    pub fn prim_names(&self) -> impl Iterator<Item = &str> {
        let prim = self.0.split_once('.').map_or(self.0.as_str(), |(p, _)| p);
        prim.split('/').filter(|s| !s.is_empty())
    }

    /// Last prim name, or the property name for property paths.
    pub fn name(&self) -> &str {
        if let Some(prop) = self.property_name() {
            return prop;
        }
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Path of a child prim.
    pub fn child(&self, name: &str) -> SdfPath {
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    /// Path of a property on this prim.
    pub fn property(&self, name: &str) -> SdfPath {
        Self(format!("{}.{}", self.prim_path().0, name))
    }

    /// Parent prim path; None for the root.
    pub fn parent(&self) -> Option<SdfPath> {
        if self.is_property() {
            return Some(self.prim_path());
        }
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }
}

/// True for USD identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Namespaced property name: identifiers joined by `:`.
pub fn is_property_name(s: &str) -> bool {
    !s.is_empty() && s.split(':').all(is_identifier)
}

fn is_prim_name(s: &str) -> bool {
    is_identifier(s)
}

impl fmt::Debug for SdfPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for SdfPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SdfPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(SdfPath::new("/lights/rect_light").is_ok());
        assert!(SdfPath::new("/lights/rect_light.inputs:shaping:cone:angle").is_ok());
        assert!(SdfPath::new("/").is_ok());
        assert!(SdfPath::new("lights").is_err());
        assert!(SdfPath::new("/lights//rect").is_err());
        assert!(SdfPath::new("/lights/1bad").is_err());
        assert!(SdfPath::new("/lights.").is_err());
    }

    #[test]
    fn test_navigation() {
        let path = SdfPath::new("/lights/rect_light.inputs:intensity").unwrap();
        assert!(path.is_property());
        assert_eq!(path.name(), "inputs:intensity");
        assert_eq!(path.prim_path().as_str(), "/lights/rect_light");
        assert_eq!(path.prim_names().collect::<Vec<_>>(), vec!["lights", "rect_light"]);

        let prim = path.prim_path();
        assert_eq!(prim.name(), "rect_light");
        assert_eq!(prim.parent().unwrap().as_str(), "/lights");
        assert_eq!(prim.parent().unwrap().parent().unwrap(), SdfPath::root());
        assert_eq!(SdfPath::root().parent(), None);

        assert_eq!(SdfPath::root().child("cam").as_str(), "/cam");
        assert_eq!(prim.property("inputs:width").as_str(), "/lights/rect_light.inputs:width");
    }
}
