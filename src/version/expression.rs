//! Compatibility expressions over platform versions
//!
//! Supported syntax:
//! - `1.18.1`, `=1.18.1` - exact match
//! - `>=1.18`, `>1.18`, `<=1.18`, `<1.19` - comparison operators
//! - `~1.18.1` - approximately equivalent (>=1.18.1 <1.19.0)
//! - `^1.2.0` - compatible with version (>=1.2.0 <2.0.0, or special cases for 0.x)
//! - `1.18.x`, `1.x`, `*` - wildcards
//! - `>=1.18 <1.19` - space-separated terms, all must hold
//! - `1.17.x || 1.18.x` - alternatives, any must hold

use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;
use crate::version::semver::{SemanticVersion, parse_loose};

const OPERATORS: &[&str] = &[">=", "<=", ">", "<", "=", "~", "^"];

/// A parsed range predicate, evaluated against one platform version.
#[derive(Debug, Clone)]
pub struct CompatibilityExpression {
    source: String,
    /// Disjunction of conjunctions
    alternatives: Vec<Vec<Term>>,
}

#[derive(Debug, Clone)]
enum Term {
    Exact(SemanticVersion),
    Gte(SemanticVersion),
    Gt(SemanticVersion),
    Lte(SemanticVersion),
    Lt(SemanticVersion),
    Tilde(SemanticVersion),
    Caret(SemanticVersion),
    Any,
    /// 1.x means >=1.0.0 <2.0.0
    WildcardMajor(u64),
    /// 1.18.x means >=1.18.0 <1.19.0
    WildcardMinor(u64, u64),
}

impl Term {
    fn parse(token: &str) -> Option<Self> {
        let version = |rest: &str| parse_loose(rest.trim()).ok();

        if let Some(rest) = token.strip_prefix(">=") {
            version(rest).map(Term::Gte)
        } else if let Some(rest) = token.strip_prefix("<=") {
            version(rest).map(Term::Lte)
        } else if let Some(rest) = token.strip_prefix('>') {
            version(rest).map(Term::Gt)
        } else if let Some(rest) = token.strip_prefix('<') {
            version(rest).map(Term::Lt)
        } else if let Some(rest) = token.strip_prefix('=') {
            version(rest).map(Term::Exact)
        } else if let Some(rest) = token.strip_prefix('~') {
            version(rest).map(Term::Tilde)
        } else if let Some(rest) = token.strip_prefix('^') {
            version(rest).map(Term::Caret)
        } else if token == "*" || token.eq_ignore_ascii_case("x") {
            Some(Term::Any)
        } else if let Some(term) = Self::parse_wildcard(token) {
            Some(term)
        } else {
            version(token).map(Term::Exact)
        }
    }

    fn parse_wildcard(token: &str) -> Option<Self> {
        let is_wildcard = |part: &str| part == "*" || part.eq_ignore_ascii_case("x");
        let parts: Vec<&str> = token.split('.').collect();

        match parts.as_slice() {
            [major, x] if is_wildcard(x) => major.parse::<u64>().ok().map(Term::WildcardMajor),
            [major, minor, x] if is_wildcard(x) => {
                let major = major.parse::<u64>().ok()?;
                let minor = minor.parse::<u64>().ok()?;
                Some(Term::WildcardMinor(major, minor))
            }
            _ => None,
        }
    }

    fn satisfies(&self, version: &SemanticVersion) -> bool {
        let actual = version.as_version();
        match self {
            Term::Exact(v) => version == v,
            Term::Gte(v) => version >= v,
            Term::Gt(v) => version > v,
            Term::Lte(v) => version <= v,
            Term::Lt(v) => version < v,
            Term::Tilde(v) => {
                let base = v.as_version();
                version >= v && actual.major == base.major && actual.minor == base.minor
            }
            Term::Caret(v) => {
                if version < v {
                    return false;
                }
                let base = v.as_version();
                // ^1.2.3 -> <2.0.0, ^0.2.3 -> <0.3.0, ^0.0.3 -> <0.0.4
                if base.major == 0 {
                    if base.minor == 0 {
                        actual.major == 0 && actual.minor == 0 && actual.patch == base.patch
                    } else {
                        actual.major == 0 && actual.minor == base.minor
                    }
                } else {
                    actual.major == base.major
                }
            }
            Term::Any => true,
            Term::WildcardMajor(major) => actual.major == *major,
            Term::WildcardMinor(major, minor) => actual.major == *major && actual.minor == *minor,
        }
    }
}

impl CompatibilityExpression {
    pub fn parse(expression: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidExpression(expression.to_string());

        let alternatives = expression
            .split("||")
            .map(|alternative| -> Option<Vec<Term>> {
                let tokens = split_terms(alternative);
                if tokens.is_empty() {
                    return None;
                }
                tokens.iter().map(|token| Term::parse(token)).collect()
            })
            .collect::<Option<Vec<Vec<Term>>>>()
            .ok_or_else(invalid)?;

        Ok(Self {
            source: expression.trim().to_string(),
            alternatives,
        })
    }

    /// Evaluate the expression against a platform version
    pub fn test(&self, version: &SemanticVersion) -> bool {
        self.alternatives
            .iter()
            .any(|terms| terms.iter().all(|term| term.satisfies(version)))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Split an alternative into terms, joining a detached operator with the
/// version that follows it (`>= 1.18` is read as `>=1.18`).
fn split_terms(alternative: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut pending: Option<&str> = None;

    for token in alternative.split_whitespace() {
        match pending.take() {
            Some(operator) => terms.push(format!("{operator}{token}")),
            None if OPERATORS.contains(&token) => pending = Some(token),
            None => terms.push(token.to_string()),
        }
    }

    // A trailing operator has nothing to compare against
    if let Some(operator) = pending {
        terms.push(operator.to_string());
    }

    terms
}

impl FromStr for CompatibilityExpression {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CompatibilityExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
