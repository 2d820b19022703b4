//! Range, length and pattern restrictions
//!
//! A [`RangeSet`] is the compiled form of a `range` or `length` statement:
//! an ascending list of disjoint closed intervals. Decimal64 ranges are kept
//! in scaled integer units so that boundaries such as `1.5` compare exactly.
//! A [`PatternRestriction`] is one `pattern` statement, matched against the
//! whole value.

use crate::error::{Error, Result, ValueError, ValueResult};
use regex::Regex;
use std::fmt;

/// A closed interval `[min, max]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<T> {
    /// Lower bound (inclusive)
    pub min: T,
    /// Upper bound (inclusive)
    pub max: T,
    /// Custom message reported when a value misses the restriction
    pub error_message: Option<String>,
}

impl<T: Copy + Ord> Interval<T> {
    /// Create a new interval
    pub fn new(min: T, max: T) -> Self {
        Self {
            min,
            max,
            error_message: None,
        }
    }

    /// Check if a value lies in this interval
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Ordered, disjoint set of closed intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet<T> {
    intervals: Vec<Interval<T>>,
}

impl<T: Copy + Ord + fmt::Display> RangeSet<T> {
    /// Create a range set from `(min, max)` pairs
    ///
    /// The pairs must be in ascending order and must not overlap.
    pub fn new(bounds: impl IntoIterator<Item = (T, T)>) -> Result<Self> {
        let intervals = bounds
            .into_iter()
            .map(|(min, max)| Interval::new(min, max))
            .collect();
        Self::from_intervals(intervals)
    }

    /// Create a range set from intervals, checking order and disjointness
    pub fn from_intervals(intervals: Vec<Interval<T>>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(Error::Type("Empty range restriction".to_string()));
        }
        for interval in &intervals {
            if interval.min > interval.max {
                return Err(Error::Type(format!(
                    "Invalid range part {}..{}: lower bound exceeds upper bound",
                    interval.min, interval.max
                )));
            }
        }
        for pair in intervals.windows(2) {
            if pair[0].max >= pair[1].min {
                return Err(Error::Type(format!(
                    "Range parts {}..{} and {}..{} are not in ascending order",
                    pair[0].min, pair[0].max, pair[1].min, pair[1].max
                )));
            }
        }
        Ok(Self { intervals })
    }

    /// Create a range set holding a single interval
    pub fn single(min: T, max: T) -> Result<Self> {
        Self::new([(min, max)])
    }

    /// Create a range set admitting exactly one value
    pub fn exact(value: T) -> Self {
        Self {
            intervals: vec![Interval::new(value, value)],
        }
    }

    /// Parse a YANG range/length expression such as `1..4 | 10 | 20..max`
    ///
    /// `lowest` and `highest` stand in for the `min` and `max` keywords;
    /// `parse_bound` converts a literal boundary into the value domain.
    pub fn parse<F>(expr: &str, lowest: T, highest: T, parse_bound: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<T>,
    {
        let bound = |text: &str| -> Result<T> {
            match text {
                "min" => Ok(lowest),
                "max" => Ok(highest),
                _ => parse_bound(text).ok_or_else(|| {
                    Error::Type(format!(
                        "Invalid boundary \"{}\" in restriction \"{}\"",
                        text, expr
                    ))
                }),
            }
        };

        let mut intervals = Vec::new();
        for part in expr.split('|') {
            let part = part.trim();
            let (min, max) = match part.split_once("..") {
                Some((min, max)) => (bound(min.trim())?, bound(max.trim())?),
                None => {
                    let value = bound(part)?;
                    (value, value)
                }
            };
            intervals.push(Interval::new(min, max));
        }
        Self::from_intervals(intervals)
    }

    /// Attach a custom violation message to every interval
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        for interval in &mut self.intervals {
            interval.error_message = Some(message.clone());
        }
        self
    }

    /// Get the intervals
    pub fn intervals(&self) -> &[Interval<T>] {
        &self.intervals
    }

    /// Custom violation message, taken from the first interval carrying one
    pub fn error_message(&self) -> Option<&str> {
        self.intervals
            .iter()
            .find_map(|interval| interval.error_message.as_deref())
    }

    /// The only admitted value, if the set is a single point
    pub fn exact_value(&self) -> Option<T> {
        match self.intervals.as_slice() {
            [only] if only.min == only.max => Some(only.min),
            _ => None,
        }
    }

    /// Check if a value falls within one of the intervals
    pub fn contains(&self, value: T) -> bool {
        let idx = self.intervals.partition_point(|interval| interval.max < value);
        self.intervals
            .get(idx)
            .is_some_and(|interval| interval.min <= value)
    }

    /// Check a numeric value; `canonical` renders it for the diagnostic
    pub fn check_value(&self, value: T, canonical: impl FnOnce() -> String) -> ValueResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ValueError::RangeViolation {
                value: canonical(),
                error_message: self.error_message().map(str::to_string),
            })
        }
    }
}

impl RangeSet<u64> {
    /// Parse a length expression (`min` is 0, `max` is `u64::MAX`)
    pub fn parse_length(expr: &str) -> Result<Self> {
        Self::parse(expr, 0, u64::MAX, |s| s.parse().ok())
    }

    /// Check a length in characters or bytes
    pub fn check_length(&self, length: u64) -> ValueResult<()> {
        if self.contains(length) {
            Ok(())
        } else {
            Err(ValueError::LengthViolation {
                length,
                error_message: self.error_message().map(str::to_string),
            })
        }
    }
}

impl<T: Copy + Ord + fmt::Display> fmt::Display for RangeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, interval) in self.intervals.iter().enumerate() {
            if idx > 0 {
                f.write_str(" | ")?;
            }
            if interval.min == interval.max {
                write!(f, "{}", interval.min)?;
            } else {
                write!(f, "{}..{}", interval.min, interval.max)?;
            }
        }
        Ok(())
    }
}

/// Check a value against an optional range restriction
pub fn check_range<T>(
    value: T,
    constraint: Option<&RangeSet<T>>,
    canonical: impl FnOnce() -> String,
) -> ValueResult<()>
where
    T: Copy + Ord + fmt::Display,
{
    match constraint {
        Some(range) => range.check_value(value, canonical),
        None => Ok(()),
    }
}

/// Check a length against an optional length restriction
pub fn check_length(length: u64, constraint: Option<&RangeSet<u64>>) -> ValueResult<()> {
    match constraint {
        Some(range) => range.check_length(length),
        None => Ok(()),
    }
}

/// A `pattern` restriction of a string type
#[derive(Debug, Clone)]
pub struct PatternRestriction {
    pattern: String,
    regex: Regex,
    inverted: bool,
    error_message: Option<String>,
}

impl PatternRestriction {
    /// Create a pattern the value must match
    pub fn new(pattern: &str) -> Result<Self> {
        // patterns are implicitly anchored at both ends
        let regex = Regex::new(&format!(r"\A(?:{})\z", pattern))
            .map_err(|e| Error::Type(format!("Invalid pattern '{}': {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            inverted: false,
            error_message: None,
        })
    }

    /// Create a pattern the value must not match (`modifier invert-match`)
    pub fn inverted(pattern: &str) -> Result<Self> {
        let mut restriction = Self::new(pattern)?;
        restriction.inverted = true;
        Ok(restriction)
    }

    /// Attach a custom violation message
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Get the pattern source
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the match is inverted
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Get the custom violation message
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Check if the whole text satisfies this restriction
    pub fn accepts(&self, text: &str) -> bool {
        self.regex.is_match(text) != self.inverted
    }
}

impl PartialEq for PatternRestriction {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.inverted == other.inverted
            && self.error_message == other.error_message
    }
}

impl Eq for PatternRestriction {}

/// Check a string against all patterns, reporting the first failing one
pub fn check_patterns(text: &str, patterns: &[PatternRestriction]) -> ValueResult<()> {
    for (idx, pattern) in patterns.iter().enumerate() {
        if !pattern.accepts(text) {
            return Err(ValueError::PatternMismatch {
                text: text.to_string(),
                pattern_index: idx + 1,
                error_message: pattern.error_message.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(10i64, 20);
        assert!(interval.contains(10));
        assert!(interval.contains(20));
        assert!(!interval.contains(9));
        assert!(!interval.contains(21));
    }

    #[test]
    fn test_range_set_membership() {
        let range = RangeSet::new([(1i64, 4), (10, 10), (20, 30)]).unwrap();

        for value in [1, 2, 4, 10, 20, 25, 30] {
            assert!(range.contains(value), "{} should be admitted", value);
        }
        for value in [0, 5, 9, 11, 19, 31, i64::MIN, i64::MAX] {
            assert!(!range.contains(value), "{} should be rejected", value);
        }
        assert_eq!(range.exact_value(), None);
    }

    #[test]
    fn test_range_set_rejects_unordered() {
        assert!(RangeSet::new([(5i64, 1)]).is_err());
        assert!(RangeSet::new([(1i64, 5), (5, 10)]).is_err());
        assert!(RangeSet::new([(10i64, 20), (1, 5)]).is_err());
        assert!(RangeSet::<i64>::new([]).is_err());
    }

    #[test]
    fn test_parse_range_expression() {
        let range = RangeSet::parse("min..-10 | 0 | 100..max", i64::from(i8::MIN), i64::from(i8::MAX), |s| {
            s.parse().ok()
        })
        .unwrap();

        assert_eq!(range.intervals().len(), 3);
        assert_eq!(range.intervals()[0].min, -128);
        assert_eq!(range.intervals()[2].max, 127);
        assert!(range.contains(0));
        assert!(!range.contains(1));
        assert_eq!(range.to_string(), "-128..-10 | 0 | 100..127");

        assert!(RangeSet::parse("1..x", 0i64, 10, |s| s.parse().ok()).is_err());
    }

    #[test]
    fn test_parse_length() {
        let length = RangeSet::parse_length("8..10").unwrap();
        assert!(length.check_length(8).is_ok());
        assert_eq!(
            length.check_length(5),
            Err(ValueError::LengthViolation {
                length: 5,
                error_message: None
            })
        );
        assert_eq!(RangeSet::parse_length("5").unwrap().exact_value(), Some(5));
        assert_eq!(length.exact_value(), None);
    }

    #[test]
    fn test_error_message_propagates() {
        let length = RangeSet::exact(5u64).with_error_message("must be of length 5");
        assert_eq!(length.error_message(), Some("must be of length 5"));

        let err = length.check_length(1).unwrap_err();
        assert_eq!(err.to_string(), "must be of length 5");
    }

    #[test]
    fn test_check_range_without_constraint() {
        assert!(check_range(i64::MAX, None, || unreachable!()).is_ok());
        assert!(check_length(u64::MAX, None).is_ok());
    }

    #[test]
    fn test_check_range_renders_canonical() {
        let range = RangeSet::single(15i64, 100).unwrap();
        let err = check_range(0, Some(&range), || "0.0".to_string()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value \"0.0\" does not satisfy the range constraint."
        );
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = PatternRestriction::new("[a-z ]*").unwrap();
        assert!(pattern.accepts("teststring"));
        assert!(pattern.accepts(""));
        assert!(!pattern.accepts("string15"));

        let partial = PatternRestriction::new("abc").unwrap();
        assert!(!partial.accepts("xabcx"));
        assert!(!partial.accepts("abc\n"));
    }

    #[test]
    fn test_inverted_pattern() {
        let pattern = PatternRestriction::inverted("[xX][mM][lL].*").unwrap();
        assert!(pattern.is_inverted());
        assert!(pattern.accepts("data"));
        assert!(!pattern.accepts("xml-data"));
    }

    #[test]
    fn test_check_patterns_reports_ordinal() {
        let patterns = vec![
            PatternRestriction::new("[a-z0-9]*").unwrap(),
            PatternRestriction::new("[a-z]*").unwrap(),
        ];
        assert!(check_patterns("abc", &patterns).is_ok());
        assert_eq!(
            check_patterns("abc1", &patterns),
            Err(ValueError::PatternMismatch {
                text: "abc1".to_string(),
                pattern_index: 2,
                error_message: None,
            })
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(PatternRestriction::new("[a-"), Err(Error::Type(_))));
    }
}
