//! Attributes: typed, possibly time-varying properties of a prim.

use super::{is_property_name, MetaData, SdfPath, TimeCode, TimeSamples};
use crate::util::{Error, Result, Value, ValueType};

/// Attribute variability qualifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variability {
    #[default]
    Varying,
    /// Written as `uniform`: cannot be animated.
    Uniform,
}

/// A typed attribute.
///
/// An attribute holds a default (constant) value, a set of time samples,
/// both, or neither. Values are validated against the declared type when
/// the attribute is built and are immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    value_type: ValueType,
    custom: bool,
    variability: Variability,
    default: Option<Value>,
    samples: Option<TimeSamples>,
    connections: Vec<SdfPath>,
    metadata: MetaData,
}

impl Attribute {
    /// Declare an attribute without any value.
    ///
    /// Fails with [`Error::InvalidPath`] if `name` is not a namespaced
    /// identifier.
    pub fn declared(name: impl Into<String>, value_type: ValueType) -> Result<Self> {
        let name = name.into();
        if !is_property_name(&name) {
            return Err(Error::InvalidPath(name));
        }
        Ok(Self {
            name,
            value_type,
            custom: false,
            variability: Variability::Varying,
            default: None,
            samples: None,
            connections: Vec::new(),
            metadata: MetaData::new(),
        })
    }

    /// Attribute with a single constant value.
    ///
    /// Fails with [`Error::TypeMismatch`] if `value` does not conform.
    pub fn constant(name: impl Into<String>, value_type: ValueType, value: Value) -> Result<Self> {
        Self::declared(name, value_type)?.with_default(value)
    }

    /// Attribute with time samples.
    ///
    /// Fails with [`Error::EmptySampleSet`], [`Error::TypeMismatch`] or
    /// [`Error::DuplicateTimeCode`].
    pub fn sampled(
        name: impl Into<String>,
        value_type: ValueType,
        samples: impl IntoIterator<Item = (TimeCode, Value)>,
    ) -> Result<Self> {
        let samples = TimeSamples::new(value_type, samples)?;
        Self::declared(name, value_type)?.with_samples(samples)
    }

    /// Set the default value.
    pub fn with_default(mut self, value: Value) -> Result<Self> {
        if !self.value_type.conforms(&value) {
            return Err(Error::mismatch(self.value_type, value.kind_name()));
        }
        self.default = Some(value);
        Ok(self)
    }

    /// Replace the time samples.
    ///
    /// Fails with [`Error::TypeMismatch`] if the sample set was built for a
    /// different type.
    pub fn with_samples(mut self, samples: TimeSamples) -> Result<Self> {
        if samples.value_type() != self.value_type {
            return Err(Error::mismatch(self.value_type, samples.value_type()));
        }
        self.samples = Some(samples);
        Ok(self)
    }

    /// Drop the default value.
    pub fn without_default(mut self) -> Self {
        self.default = None;
        self
    }

    /// Drop the time samples.
    pub fn without_samples(mut self) -> Self {
        self.samples = None;
        self
    }

    pub fn with_custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }

    pub fn with_variability(mut self, variability: Variability) -> Self {
        self.variability = variability;
        self
    }

    pub fn with_connections(mut self, connections: Vec<SdfPath>) -> Self {
        self.connections = connections;
        self
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attribute name, including namespaces (`inputs:shaping:cone:angle`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First namespace component, or the whole name when not namespaced.
    pub fn namespace(&self) -> &str {
        self.name.split(':').next().unwrap_or(&self.name)
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    #[inline]
    pub fn variability(&self) -> Variability {
        self.variability
    }

    /// Default value, if authored.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Time samples, if authored.
    pub fn time_samples(&self) -> Option<&TimeSamples> {
        self.samples.as_ref()
    }

    /// Connection targets (`.connect`).
    pub fn connections(&self) -> &[SdfPath] {
        &self.connections
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    /// True when the attribute resolves to one value for all times.
    pub fn is_constant(&self) -> bool {
        self.samples.is_none() && self.default.is_some()
    }

    /// True when the attribute has time samples.
    pub fn is_sampled(&self) -> bool {
        self.samples.is_some()
    }

    /// True when the attribute has any value to resolve.
    pub fn has_value(&self) -> bool {
        self.samples.is_some() || self.default.is_some()
    }

    /// Sample times in increasing order; empty for constants.
    pub fn sample_times(&self) -> Vec<TimeCode> {
        self.samples
            .as_ref()
            .map(|s| s.times().collect())
            .unwrap_or_default()
    }

    /// Number of time samples.
    pub fn num_samples(&self) -> usize {
        self.samples.as_ref().map_or(0, TimeSamples::len)
    }

    /// Resolve the value seen at `time` (held-step).
    pub fn get(&self, time: f64) -> Result<&Value> {
        super::resolve(self, time)
    }
}
