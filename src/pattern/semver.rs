//! Semantic version patterns
//!
//! Constraint expressions follow the usual range syntax:
//! - `1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3`, `~1.2.3` (also `~>`) - caret and tilde ranges
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `!=1.2.3` - comparison operators
//! - `1.2.x`, `1.*`, `*` - wildcards
//! - `1.0.0 - 2.0.0` - inclusive hyphen range
//! - `>=1.2.0 <2.0.0`, `>=1.2.0, <2.0.0` - AND (space or comma separated)
//! - `^1.0.0 || ^2.0.0` - OR

use std::cmp::Ordering;

#[cfg(test)]
use mockall::automock;
use semver::{Comparator, Version, VersionReq};
use tracing::debug;

use crate::image::{NewerFn, by_semver_tag_desc};
use crate::pattern::error::PatternError;
use crate::pattern::{SEMVER_PREFIX, TagMatcher};

/// Expression that matches every tag that is a valid version
const MATCH_ALL: &str = "*";

/// Longest operators first so `>=` is not read as `>`
const OPERATORS: &[&str] = &["!=", ">=", "=>", "<=", "=<", "~>", ">", "<", "=", "~", "^"];

/// Normalize a tag into a full `major.minor.patch` version string.
///
/// Strips a leading `v` and pads partial versions with zeros:
/// - "v1.2.3" -> "1.2.3"
/// - "1" -> "1.0.0"
/// - "1.2-rc1" -> "1.2.0-rc1"
fn normalize_version(raw: &str) -> String {
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    let core_end = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(core_end);

    match core.split('.').count() {
        1 => format!("{core}.0.0{suffix}"),
        2 => format!("{core}.0{suffix}"),
        _ => raw.to_string(),
    }
}

/// Parse a tag as a semantic version, accepting a `v` prefix and partial versions.
///
/// Returns `None` for tags such as `latest` that are not versions.
pub fn parse_version(tag: &str) -> Option<Version> {
    Version::parse(&normalize_version(tag)).ok()
}

/// A parsed constraint expression: any alternative may match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintSet {
    alternatives: Vec<Alternative>,
}

/// Comparators that must all hold for a version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Alternative {
    req: VersionReq,
    /// Versions rejected by `!=`
    excluded: Vec<Version>,
}

impl ConstraintSet {
    /// Parse a constraint expression
    pub fn parse(expression: &str) -> Result<Self, PatternError> {
        if expression.trim().is_empty() {
            return Err(PatternError::EmptyConstraint);
        }

        let alternatives = expression
            .split("||")
            .map(Alternative::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    /// Check if a version satisfies any alternative
    pub fn check(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|alt| alt.check(version))
    }
}

impl Alternative {
    fn parse(spec: &str) -> Result<Self, PatternError> {
        let tokens: Vec<&str> = spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(PatternError::EmptyConstraint);
        }

        let mut comparators = Vec::new();
        let mut excluded = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];

            // Hyphen range: 1.0.0 - 2.0.0 means >=1.0.0 <=2.0.0
            if tokens.get(i + 1) == Some(&"-") {
                let upper = tokens
                    .get(i + 2)
                    .ok_or_else(|| PatternError::DanglingOperator("-".to_string()))?;
                comparators.extend(parse_comparator(">=", token)?);
                comparators.extend(parse_comparator("<=", upper)?);
                i += 3;
                continue;
            }

            let (op, rest) = split_operator(token);
            // Operator separated from its version by whitespace: ">= 1.2"
            let version = if rest.is_empty() {
                i += 1;
                *tokens
                    .get(i)
                    .ok_or_else(|| PatternError::DanglingOperator(op.to_string()))?
            } else {
                rest
            };
            i += 1;

            if op == "!=" {
                excluded.push(parse_exact(version)?);
            } else {
                comparators.extend(parse_comparator(op, version)?);
            }
        }

        Ok(Self {
            req: VersionReq { comparators },
            excluded,
        })
    }

    fn check(&self, version: &Version) -> bool {
        self.req.matches(version)
            && !self
                .excluded
                .iter()
                .any(|v| v.cmp_precedence(version) == Ordering::Equal)
    }
}

fn split_operator(token: &str) -> (&str, &str) {
    OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token))
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

/// Parse one comparator. Returns `None` for a full wildcard, which constrains nothing.
fn parse_comparator(op: &str, version: &str) -> Result<Option<Comparator>, PatternError> {
    let version = version.strip_prefix('v').unwrap_or(version);
    if is_wildcard(version) {
        return Ok(None);
    }

    let op = match op {
        "=>" => ">=",
        "=<" => "<=",
        "~>" => "~",
        // A bare version is an exact match, a bare wildcard stays a wildcard
        "" if version.split('.').any(is_wildcard) => "",
        "" => "=",
        other => other,
    };

    let text = format!("{op}{version}");
    Comparator::parse(&text)
        .map(Some)
        .map_err(|source| PatternError::InvalidConstraint {
            expression: text,
            source,
        })
}

fn parse_exact(version: &str) -> Result<Version, PatternError> {
    let text = normalize_version(version);
    Version::parse(&text).map_err(|source| PatternError::InvalidConstraint {
        expression: format!("!={version}"),
        source,
    })
}

/// Version parsing and constraint evaluation primitive
#[cfg_attr(test, automock)]
pub trait VersionScheme: Send + Sync {
    /// Parse a tag as a version, `None` if it is not one
    fn parse_version(&self, tag: &str) -> Option<Version>;

    /// Returns true if `version` satisfies `constraints`
    fn check(&self, constraints: &ConstraintSet, version: &Version) -> bool;
}

/// Default scheme backed by the `semver` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverScheme;

impl VersionScheme for SemverScheme {
    fn parse_version(&self, tag: &str) -> Option<Version> {
        parse_version(tag)
    }

    fn check(&self, constraints: &ConstraintSet, version: &Version) -> bool {
        constraints.check(version)
    }
}

/// Pattern matching tags by semantic version constraints.
///
/// Holds the expression without its prefix and the parsed constraints, which are `None`
/// when the expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemverPattern {
    expression: String,
    constraints: Option<ConstraintSet>,
}

impl SemverPattern {
    /// Create a pattern, keeping an unparsable expression as "no constraint"
    pub fn new(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let constraints = match ConstraintSet::parse(&expression) {
            Ok(constraints) => Some(constraints),
            Err(e) => {
                debug!("Ignoring semver constraint '{}': {}", expression, e);
                None
            }
        };
        Self {
            expression,
            constraints,
        }
    }

    /// Create a pattern, failing if the expression does not parse
    pub fn try_new(expression: impl Into<String>) -> Result<Self, PatternError> {
        let expression = expression.into();
        let constraints = ConstraintSet::parse(&expression)?;
        Ok(Self {
            expression,
            constraints: Some(constraints),
        })
    }

    /// The constraint expression without the `semver:` prefix
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn constraints(&self) -> Option<&ConstraintSet> {
        self.constraints.as_ref()
    }

    /// Match `tag` using the given scheme instead of [`SemverScheme`]
    pub fn matches_with(&self, scheme: &dyn VersionScheme, tag: &str) -> bool {
        let Some(version) = scheme.parse_version(tag) else {
            return false;
        };

        if self.expression == MATCH_ALL {
            return true;
        }

        // Invalid constraints match every version
        let Some(constraints) = &self.constraints else {
            return true;
        };

        scheme.check(constraints, &version)
    }
}

impl TagMatcher for SemverPattern {
    fn matches(&self, tag: &str) -> bool {
        self.matches_with(&SemverScheme, tag)
    }

    fn image_newer_fn(&self) -> NewerFn {
        by_semver_tag_desc
    }

    fn is_valid(&self) -> bool {
        self.constraints.is_some()
    }
}

impl std::fmt::Display for SemverPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", SEMVER_PREFIX, self.expression)
    }
}
