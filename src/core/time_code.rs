//! Time codes: the keys of time-sampled attributes.

use crate::util::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A finite frame index, integral or fractional.
///
/// Time codes are totally ordered. `-0.0` is normalized to `0.0` so that
/// equality, ordering and hashing agree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeCode(f64);

impl TimeCode {
    /// Create a time code, rejecting NaN and infinities.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidTimeCode(value));
        }
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Raw frame value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// True when the time code is a whole frame.
    #[inline]
    pub fn is_integral(self) -> bool {
        self.0.fract() == 0.0
    }
}

impl Eq for TimeCode {}

impl PartialOrd for TimeCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for TimeCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<i32> for TimeCode {
    fn from(frame: i32) -> Self {
        Self(frame as f64)
    }
}

impl TryFrom<f64> for TimeCode {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // shortest representation that parses back to the same f64
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(TimeCode::new(f64::NAN), Err(Error::InvalidTimeCode(_))));
        assert!(TimeCode::new(f64::INFINITY).is_err());
        assert!(TimeCode::new(30.9).is_ok());
    }

    #[test]
    fn test_ordering_and_zero() {
        let neg_zero = TimeCode::new(-0.0).unwrap();
        assert_eq!(neg_zero, TimeCode::from(0));
        assert_eq!(neg_zero.cmp(&TimeCode::from(0)), Ordering::Equal);
        assert!(TimeCode::from(1) < TimeCode::new(1.5).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeCode::from(11).to_string(), "11");
        assert_eq!(TimeCode::new(1.25).unwrap().to_string(), "1.25");
        assert!(TimeCode::from(3).is_integral());
        assert!(!TimeCode::new(3.5).unwrap().is_integral());
    }
}
