//! Reconciliation of npm-style semver ranges.
//!
//! Only the three shapes that appear in hoisted manifests are understood: a
//! caret range (`^1.2.3`), a tilde range (`~1.2.3`) and an exact version
//! (`1.2.3`). Everything else is rejected as invalid semver.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;
use tracing::debug;

use crate::error::{Error, Result};

/// Range operator, ordered from least to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RangeOperator {
    Exact,
    Tilde,
    Caret,
}

impl RangeOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOperator::Exact => "",
            RangeOperator::Tilde => "~",
            RangeOperator::Caret => "^",
        }
    }

    fn of(range: &str) -> Self {
        if range.starts_with('^') {
            RangeOperator::Caret
        } else if range.starts_with('~') {
            RangeOperator::Tilde
        } else {
            RangeOperator::Exact
        }
    }
}

/// A parsed `^`, `~` or exact range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub operator: RangeOperator,
    pub version: Version,
}

impl VersionRange {
    /// Parses a range, cleaning a leading `v` or `=` and surrounding whitespace
    /// from the version the way npm does.
    pub fn parse(range: &str) -> Result<Self> {
        let trimmed = range.trim();
        let operator = RangeOperator::of(trimmed);
        let rest = trimmed[operator.as_str().len()..].trim_start();
        let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
        let rest = rest
            .strip_prefix('v')
            .or_else(|| rest.strip_prefix('V'))
            .unwrap_or(rest);

        let version =
            Version::parse(rest).map_err(|_| Error::InvalidSemver(range.to_string()))?;
        Ok(Self { operator, version })
    }

    /// Lowest version the range admits.
    fn lower(&self) -> &Version {
        &self.version
    }

    /// Exclusive upper bound, or `None` when the range is a single version.
    fn upper(&self) -> Option<Version> {
        let v = &self.version;
        match self.operator {
            RangeOperator::Exact => None,
            RangeOperator::Tilde => Some(Version::new(v.major, v.minor + 1, 0)),
            RangeOperator::Caret => Some(if v.major > 0 {
                Version::new(v.major + 1, 0, 0)
            } else if v.minor > 0 {
                Version::new(0, v.minor + 1, 0)
            } else {
                Version::new(0, 0, v.patch + 1)
            }),
        }
    }

    fn contains(&self, candidate: &Version) -> bool {
        match self.upper() {
            None => candidate == &self.version,
            Some(upper) => candidate >= self.lower() && *candidate < upper,
        }
    }

    /// Whether some version satisfies both ranges.
    pub fn intersects(&self, other: &VersionRange) -> bool {
        match (self.upper(), other.upper()) {
            (None, _) => other.contains(&self.version),
            (_, None) => self.contains(&other.version),
            (Some(a_upper), Some(b_upper)) => {
                let lower = self.lower().max(other.lower());
                let upper = a_upper.min(b_upper);
                *lower < upper
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)
    }
}

/// Picks a single range satisfying both `left` and `right`.
///
/// A `None` side places no constraint, so the other side is returned as is.
/// When both sides share an operator, the input string with the greater
/// version wins. Otherwise the most permissive operator (caret, then tilde,
/// then exact) is combined with the greater of the two versions.
pub fn reconcile(left: Option<&str>, right: Option<&str>) -> Result<String> {
    debug!(?left, ?right, "reconciling versions");

    let (left, right) = match (left, right) {
        (None, None) => return Err(Error::NoVersion),
        (Some(only), None) | (None, Some(only)) => return Ok(only.to_string()),
        (Some(l), Some(r)) => (l, r),
    };

    let left_range = VersionRange::parse(left)?;
    let right_range = VersionRange::parse(right)?;

    if !left_range.intersects(&right_range) {
        debug!(left, right, "versions are not compatible");
        return Err(Error::IncompatibleVersions {
            left: left.to_string(),
            right: right.to_string(),
        });
    }

    let left_is_greater = left_range.version.cmp(&right_range.version) == Ordering::Greater;

    if left_range.operator == right_range.operator {
        return Ok(if left_is_greater { left } else { right }.to_string());
    }

    let operator = left_range.operator.max(right_range.operator);
    let version = if left_is_greater {
        &left_range.version
    } else {
        &right_range.version
    };
    Ok(format!("{}{}", operator.as_str(), version))
}

/// Exact version carried by a range, without its operator.
pub fn exact_version(range: &str) -> Result<Version> {
    VersionRange::parse(range).map(|r| r.version)
}
