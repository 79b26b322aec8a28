//! Inclusive frame ranges (`start:end`), as passed to render tools.

use crate::util::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive range of whole frames.
///
/// Serializes as a two-element array `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "(i64, i64)", try_from = "(i64, i64)")]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    /// Create a range; `end` must not precede `start`.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidFrameRange(format!("{start}:{end}")));
        }
        Ok(Self { start, end })
    }

    /// Single-frame range.
    pub const fn single(frame: i64) -> Self {
        Self { start: frame, end: frame }
    }

    /// Number of frames, counting both ends.
    #[inline]
    pub fn num_frames(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    #[inline]
    pub fn has_frame(&self, frame: i64) -> bool {
        self.start <= frame && frame <= self.end
    }

    pub fn is_superset(&self, other: &FrameRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_subset(&self, other: &FrameRange) -> bool {
        other.is_superset(self)
    }

    /// Every frame in the range, in order.
    pub fn iter_frames(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    /// `5` for single frames, `1-31` otherwise.
    pub fn display_str(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for FrameRange {
    type Err = Error;

    /// Parse `N` or `start:end`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidFrameRange(s.to_string());
        let parse = |part: &str| part.trim().parse::<i64>().map_err(|_| bad());
        let mut parts = s.split(':');
        let first = parts.next().ok_or_else(bad)?;
        match (parts.next(), parts.next()) {
            (None, _) => Ok(Self::single(parse(first)?)),
            (Some(second), None) => Self::new(parse(first)?, parse(second)?),
            (Some(_), Some(_)) => Err(bad()),
        }
    }
}

impl From<FrameRange> for (i64, i64) {
    fn from(range: FrameRange) -> Self {
        (range.start, range.end)
    }
}

impl TryFrom<(i64, i64)> for FrameRange {
    type Error = Error;

    fn try_from((start, end): (i64, i64)) -> Result<Self> {
        Self::new(start, end)
    }
}
