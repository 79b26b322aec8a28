//! Time samples for animated attributes.
//!
//! A [`TimeSamples`] set is an ordered, non-empty list of `(time, value)`
//! pairs with unique times. Lookup uses binary search over the sorted times.

use super::TimeCode;
use crate::util::{Error, Result, Value, ValueType};

/// Ordered, validated time samples.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSamples {
    value_type: ValueType,
    samples: Vec<(TimeCode, Value)>,
}

impl TimeSamples {
    /// Build a sample set for an attribute of type `ty`.
    ///
    /// Samples may arrive in any order; they are stored sorted by time.
    /// Fails with [`Error::EmptySampleSet`], [`Error::TypeMismatch`] or
    /// [`Error::DuplicateTimeCode`].
    pub fn new(ty: ValueType, samples: impl IntoIterator<Item = (TimeCode, Value)>) -> Result<Self> {
        let mut samples: Vec<(TimeCode, Value)> = samples.into_iter().collect();
        if samples.is_empty() {
            return Err(Error::EmptySampleSet);
        }
        if let Some((_, bad)) = samples.iter().find(|(_, v)| !ty.conforms(v)) {
            return Err(Error::mismatch(ty, bad.kind_name()));
        }
        samples.sort_by_key(|(t, _)| *t);
        if let Some(pair) = samples.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Error::DuplicateTimeCode(pair[0].0.value()));
        }
        Ok(Self { value_type: ty, samples })
    }

    /// Type every sample conforms to.
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Number of samples (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: a sample set holds at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample times in increasing order.
    pub fn times(&self) -> impl Iterator<Item = TimeCode> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }

    /// Iterate over `(time, value)` pairs in increasing time order.
    pub fn iter(&self) -> impl Iterator<Item = (TimeCode, &Value)> + '_ {
        self.samples.iter().map(|(t, v)| (*t, v))
    }

    /// Sample at an index.
    pub fn get(&self, index: usize) -> Option<(TimeCode, &Value)> {
        self.samples.get(index).map(|(t, v)| (*t, v))
    }

    /// First sample.
    pub fn first(&self) -> (TimeCode, &Value) {
        let (t, v) = &self.samples[0];
        (*t, v)
    }

    /// Last sample.
    pub fn last(&self) -> (TimeCode, &Value) {
        let (t, v) = &self.samples[self.samples.len() - 1];
        (*t, v)
    }

    /// Largest index whose time is <= `time`; 0 when `time` precedes every sample.
    pub fn floor_index(&self, time: f64) -> usize {
        let after = self.samples.partition_point(|(t, _)| t.value() <= time);
        after.saturating_sub(1)
    }

    /// Smallest index whose time is >= `time`; the last index when `time`
    /// follows every sample.
    pub fn ceil_index(&self, time: f64) -> usize {
        let idx = self.samples.partition_point(|(t, _)| t.value() < time);
        idx.min(self.samples.len() - 1)
    }

    /// Index of the sample nearest to `time` (ties go to the earlier sample).
    pub fn near_index(&self, time: f64) -> usize {
        let floor = self.floor_index(time);
        let ceil = self.ceil_index(time);
        let floor_dist = (time - self.samples[floor].0.value()).abs();
        let ceil_dist = (self.samples[ceil].0.value() - time).abs();
        if floor_dist <= ceil_dist {
            floor
        } else {
            ceil
        }
    }

    /// Held-step lookup: value of the latest sample at or before `time`,
    /// or the first sample's value when `time` precedes all samples.
    pub fn held_value(&self, time: f64) -> &Value {
        &self.samples[self.floor_index(time)].1
    }
}
