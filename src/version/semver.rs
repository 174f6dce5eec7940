use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

use crate::version::error::VersionError;

/// Upstream convention for build numbers that is not valid SemVer metadata
const BUILD_SUFFIX: &str = "+build";

const UNSPECIFIED: &str = "unspecified";

/// `v1`, `1.2`, `1.2.3.4`, `1.2-rc.1`, `1.2.3+meta`
static LOOSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?((?:\.\d+)*)(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$",
    )
    .expect("loose version pattern is valid")
});

/// A parsed semantic version ordered by SemVer precedence.
///
/// Build metadata is kept for display but never takes part in ordering or
/// equality, so `1.0.0+a == 1.0.0+b`.
#[derive(Debug, Clone)]
pub struct SemanticVersion(Version);

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    pub fn as_version(&self) -> &Version {
        &self.0
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Trim the raw string and drop a trailing `+build...` suffix.
///
/// Examples:
/// - "1.2.3+build.7" -> "1.2.3"
/// - " 0.4.0 " -> "0.4.0"
/// - "1.2.3+mc1.18" -> "1.2.3+mc1.18" (regular metadata is left alone)
pub fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find(BUILD_SUFFIX) {
        Some(index) => trimmed[..index].trim_end(),
        None => trimmed,
    }
}

/// Whether the raw version is the `unspecified` placeholder some uploads carry.
pub fn is_unspecified(raw: &str) -> bool {
    normalize(raw).eq_ignore_ascii_case(UNSPECIFIED)
}

/// Parse a version string following the SemVer 2.0 grammar.
pub fn parse(raw: &str) -> Result<SemanticVersion, VersionError> {
    Version::parse(normalize(raw))
        .map(SemanticVersion)
        .map_err(|_| VersionError::InvalidVersion(raw.to_string()))
}

/// Parse a version string, tolerating the shapes found in the wild.
///
/// Accepts a `v` prefix, missing minor/patch components (padded with zeros)
/// and extra numeric components, which are moved into build metadata and
/// therefore ignored for ordering.
///
/// Examples:
/// - "1" -> 1.0.0
/// - "v1.18" -> 1.18.0
/// - "1.2.3.4" -> 1.2.3+4
/// - "0.5-beta.2" -> 0.5.0-beta.2
pub fn parse_loose(raw: &str) -> Result<SemanticVersion, VersionError> {
    let invalid = || VersionError::InvalidVersion(raw.to_string());
    let caps = LOOSE_VERSION.captures(normalize(raw)).ok_or_else(invalid)?;

    let component = |index: usize| -> Result<u64, VersionError> {
        caps.get(index)
            .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
    };
    let mut version = Version::new(component(1)?, component(2)?, component(3)?);

    if let Some(pre) = caps.get(5) {
        version.pre = Prerelease::new(pre.as_str()).map_err(|_| invalid())?;
    }

    let extra = caps
        .get(4)
        .map(|m| m.as_str().trim_start_matches('.'))
        .filter(|s| !s.is_empty());
    let metadata = match (extra, caps.get(6).map(|m| m.as_str())) {
        (Some(extra), Some(build)) => format!("{extra}.{build}"),
        (Some(extra), None) => extra.to_string(),
        (None, Some(build)) => build.to_string(),
        (None, None) => String::new(),
    };
    if !metadata.is_empty() {
        version.build = BuildMetadata::new(&metadata).map_err(|_| invalid())?;
    }

    Ok(SemanticVersion(version))
}

/// SemVer precedence: numeric triple first, then pre-release, where a release
/// outranks every pre-release of the same triple. Build metadata is ignored.
pub fn compare(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    let (a, b) = (&a.0, &b.0);
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3+build.7", "1.2.3")]
    #[case("1.2.3+build", "1.2.3")]
    #[case("  0.4.0  ", "0.4.0")]
    #[case("1.2.3+mc1.18", "1.2.3+mc1.18")]
    #[case("1.2.3", "1.2.3")]
    fn normalize_strips_build_suffix(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[rstest]
    #[case("unspecified", true)]
    #[case("UNSPECIFIED", true)]
    #[case(" Unspecified+build.1", true)]
    #[case("1.0.0", false)]
    #[case("unspecified-1", false)]
    fn is_unspecified_ignores_case(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_unspecified(raw), expected);
    }

    #[rstest]
    #[case("1.2.3", Some((1, 2, 3)))]
    #[case("1.2.3-rc.1", Some((1, 2, 3)))]
    #[case("1.2.3+build.42", Some((1, 2, 3)))]
    #[case("1.2", None)]
    #[case("v1.2.3", None)]
    #[case("not-a-version", None)]
    fn parse_follows_strict_grammar(#[case] raw: &str, #[case] expected: Option<(u64, u64, u64)>) {
        let parsed = parse(raw).ok().map(|v| {
            let v = v.as_version();
            (v.major, v.minor, v.patch)
        });
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_reports_the_raw_input() {
        assert_eq!(
            parse("1.x"),
            Err(VersionError::InvalidVersion("1.x".to_string()))
        );
    }

    #[rstest]
    #[case("1", "1.0.0")]
    #[case("v1.18", "1.18.0")]
    #[case("1.18.1", "1.18.1")]
    #[case("1.2.3.4", "1.2.3+4")]
    #[case("0.5-beta.2", "0.5.0-beta.2")]
    #[case("2.0.0+build.9", "2.0.0")]
    #[case("3.1.0+mc1.18", "3.1.0+mc1.18")]
    fn parse_loose_accepts_partial_versions(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_loose(raw).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("release")]
    #[case("1.2.x")]
    #[case("1..2")]
    #[case("1.2.3-")]
    fn parse_loose_rejects_garbage(#[case] raw: &str) {
        assert!(parse_loose(raw).is_err());
    }

    #[rstest]
    #[case("1.0.0", "2.0.0", Ordering::Less)]
    #[case("1.10.0", "1.9.0", Ordering::Greater)]
    #[case("1.0.0-alpha", "1.0.0", Ordering::Less)]
    #[case("1.0.0-alpha", "1.0.0-beta", Ordering::Less)]
    #[case("1.0.0-rc.2", "1.0.0-rc.10", Ordering::Less)]
    #[case("1.0.0+a", "1.0.0+b", Ordering::Equal)]
    #[case("1.0.0-rc.1+x", "1.0.0-rc.1", Ordering::Equal)]
    fn compare_uses_precedence(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        let (a, b) = (parse(a).unwrap(), parse(b).unwrap());
        assert_eq!(compare(&a, &b), expected);
        assert_eq!(compare(&b, &a), expected.reverse());
    }

    #[test]
    fn build_metadata_does_not_affect_equality() {
        assert_eq!(parse_loose("1.2.3.4").unwrap(), SemanticVersion::new(1, 2, 3));
    }
}
