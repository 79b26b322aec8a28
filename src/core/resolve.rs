//! Time-sample resolution.
//!
//! Animated light and camera parameters in the test scenes are authored as
//! steps, so resolution is held-step: the value of the latest sample at or
//! before the query time, with the first sample held before the start.
//! No interpolation is ever applied.

use super::{Attribute, TimeCode};
use crate::util::{Error, Result, Value};

/// Value an observer sees for `attr` at `time`.
///
/// - Sampled: greatest sample time <= `time`; first sample if `time` is earlier.
/// - Constant: the default value for any time.
/// - Neither: [`Error::UnresolvedAttribute`].
///
/// Time samples take precedence over a default value when both are authored.
/// A NaN `time` is [`Error::InvalidTimeCode`].
pub fn resolve(attr: &Attribute, time: f64) -> Result<&Value> {
    if time.is_nan() {
        return Err(Error::InvalidTimeCode(time));
    }
    if let Some(samples) = attr.time_samples() {
        return Ok(samples.held_value(time));
    }
    attr.default_value()
        .ok_or_else(|| Error::UnresolvedAttribute(attr.name().to_string()))
}

/// Resolve at every time in `times`.
pub fn resolve_many<'a>(
    attr: &'a Attribute,
    times: impl IntoIterator<Item = f64>,
) -> Result<Vec<(f64, &'a Value)>> {
    times
        .into_iter()
        .map(|t| resolve(attr, t).map(|v| (t, v)))
        .collect()
}

/// Sorted union of the sample times of several attributes.
pub fn unioned_sample_times<'a>(attrs: impl IntoIterator<Item = &'a Attribute>) -> Vec<TimeCode> {
    let mut times: Vec<TimeCode> = attrs
        .into_iter()
        .filter_map(Attribute::time_samples)
        .flat_map(|s| s.times())
        .collect();
    times.sort();
    times.dedup();
    times
}
