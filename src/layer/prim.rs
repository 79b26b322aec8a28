//! Prims and their properties.

use crate::core::{is_identifier, is_property_name, Attribute, ListOp, MetaData, SdfPath};
use crate::util::{Error, Result};
use smallvec::SmallVec;

/// How a prim is introduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Specifier {
    #[default]
    Def,
    Over,
    Class,
}

impl Specifier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Def => "def",
            Self::Over => "over",
            Self::Class => "class",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "def" => Some(Self::Def),
            "over" => Some(Self::Over),
            "class" => Some(Self::Class),
            _ => None,
        }
    }
}

/// Relationship target list.
pub type Targets = SmallVec<[SdfPath; 1]>;

/// Named reference from a prim to other paths (`rel light:filters = None`).
///
/// `targets` is None when the relationship is only declared; an empty list
/// is written as `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    name: String,
    custom: bool,
    op: Option<ListOp>,
    targets: Option<Targets>,
    metadata: MetaData,
}

impl Relationship {
    /// Declared relationship with no targets assigned.
    pub fn declared(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_property_name(&name) {
            return Err(Error::InvalidPath(name));
        }
        Ok(Self {
            name,
            custom: false,
            op: None,
            targets: None,
            metadata: MetaData::new(),
        })
    }

    /// Relationship with the given targets.
    pub fn new(name: impl Into<String>, targets: impl IntoIterator<Item = SdfPath>) -> Result<Self> {
        Ok(Self::declared(name)?.with_targets(targets))
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = SdfPath>) -> Self {
        self.targets = Some(targets.into_iter().collect());
        self
    }

    pub fn with_custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }

    pub fn with_op(mut self, op: Option<ListOp>) -> Self {
        self.op = op;
        self
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn op(&self) -> Option<ListOp> {
        self.op
    }

    /// Assigned targets; None when only declared.
    pub fn targets(&self) -> Option<&[SdfPath]> {
        self.targets.as_deref()
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }
}

/// A prim property.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Attribute(Attribute),
    Relationship(Relationship),
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(a) => a.name(),
            Self::Relationship(r) => r.name(),
        }
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Self::Attribute(a) => Some(a),
            Self::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Relationship(r) => Some(r),
            Self::Attribute(_) => None,
        }
    }
}

impl From<Attribute> for Property {
    fn from(attr: Attribute) -> Self {
        Self::Attribute(attr)
    }
}

impl From<Relationship> for Property {
    fn from(rel: Relationship) -> Self {
        Self::Relationship(rel)
    }
}

/// A named node of the scene hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct Prim {
    specifier: Specifier,
    type_name: Option<String>,
    name: String,
    metadata: MetaData,
    properties: Vec<Property>,
    children: Vec<Prim>,
}

impl Prim {
    /// New prim without properties or children.
    ///
    /// Fails with [`Error::InvalidPath`] unless `name` and `type_name` are
    /// identifiers.
    pub fn new(specifier: Specifier, type_name: Option<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(Error::InvalidPath(name));
        }
        if let Some(bad) = type_name.as_deref().filter(|t| !is_identifier(t)) {
            return Err(Error::InvalidPath(bad.to_string()));
        }
        Ok(Self {
            specifier,
            type_name,
            name,
            metadata: MetaData::new(),
            properties: Vec::new(),
            children: Vec::new(),
        })
    }

    /// `def <type_name> "<name>"`.
    pub fn def(type_name: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(Specifier::Def, Some(type_name.into()), name)
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add or replace a property (matched by name).
    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.set_property(property.into());
        self
    }

    pub fn with_child(mut self, child: Prim) -> Self {
        self.children.push(child);
        self
    }

    pub fn specifier(&self) -> Specifier {
        self.specifier
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn children(&self) -> &[Prim] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Prim> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.property(name).and_then(Property::as_attribute)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.property(name).and_then(Property::as_relationship)
    }

    /// All attributes in authored order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.properties.iter().filter_map(Property::as_attribute)
    }

    pub(crate) fn set_property(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.name() == property.name()) {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Prim> {
        &mut self.children
    }
}
