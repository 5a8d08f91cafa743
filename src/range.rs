//! Time ranges and the half-open range classifier

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// Where a probe timestamp falls relative to a half-open span `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Strictly below `lower`
    Before,
    /// `lower <= probe < upper`
    Inside,
    /// At or above `upper`
    After,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Before => write!(f, "before"),
            Position::Inside => write!(f, "inside"),
            Position::After => write!(f, "after"),
        }
    }
}

/// Classify `probe` against the span `[lower, upper)`.
///
/// A degenerate span (`lower == upper`) contains nothing, so a probe equal to
/// both bounds is `After`.
pub fn classify(lower: &Timestamp, upper: &Timestamp, probe: &Timestamp) -> Position {
    if probe < lower {
        Position::Before
    } else if probe < upper {
        Position::Inside
    } else {
        Position::After
    }
}

/// Query range, start inclusive and end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: Timestamp,
    /// End time (exclusive)
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new time range; `start` must be strictly before `end`
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_range(format!(
                "start time {} is after end time {}",
                start, end
            )));
        }
        if start == end {
            return Err(Error::invalid_range(format!(
                "start and end time are equal ({})",
                start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from RFC 3339 text
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(Timestamp::parse(start)?, Timestamp::parse(end)?)
    }

    /// Check if a timestamp is in this range
    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        classify(&self.start, &self.end, timestamp) == Position::Inside
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
