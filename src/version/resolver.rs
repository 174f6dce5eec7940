//! Latest compatible artifact resolution
//!
//! Picks, among the artifacts of one mod, the newest one that supports the
//! running platform and is strictly newer than a baseline version.

use tracing::{debug, warn};

use crate::catalog::types::{Artifact, Mod};
use crate::version::error::VersionError;
use crate::version::expression::CompatibilityExpression;
use crate::version::semver::{SemanticVersion, is_unspecified, parse_loose};

/// Find the newest artifact of `entry` that is newer than `baseline`.
///
/// Artifacts without a compatibility expression, with an `unspecified`
/// version, or whose expression does not hold for `platform_version`
/// (unless `loose` is set) are never selected. Malformed expressions or
/// versions only disqualify the artifact that carries them.
///
/// # Returns
/// * `Ok(Some(artifact))` - The newest eligible artifact (first one wins on ties)
/// * `Ok(None)` - No artifact qualifies
/// * `Err(VersionError)` - The platform version itself is unparseable
pub fn latest_compatible<'a>(
    entry: &'a Mod,
    baseline: &str,
    platform_version: &str,
    loose: bool,
) -> Result<Option<&'a Artifact>, VersionError> {
    let platform = parse_loose(platform_version)?;

    let Ok(baseline) = parse_loose(baseline) else {
        warn!("Cannot compare {} artifacts against baseline {:?}", entry.id, baseline);
        return Ok(None);
    };

    let mut latest: Option<(SemanticVersion, &Artifact)> = None;

    for artifact in &entry.artifacts {
        let candidate = match candidate_version(artifact, &platform, loose) {
            Ok(Some(version)) => version,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping {} artifact {}: {}", entry.id, artifact.version, e);
                continue;
            }
        };

        let floor = latest.as_ref().map_or(&baseline, |(version, _)| version);
        if candidate > *floor {
            latest = Some((candidate, artifact));
        }
    }

    if let Some((version, _)) = &latest {
        debug!("Latest compatible version of {} is {}", entry.id, version);
    }

    Ok(latest.map(|(_, artifact)| artifact))
}

/// Evaluate one artifact.
///
/// `Ok(None)` means the artifact is ineligible for an ordinary reason,
/// `Err` means it carries malformed data.
fn candidate_version(
    artifact: &Artifact,
    platform: &SemanticVersion,
    loose: bool,
) -> Result<Option<SemanticVersion>, VersionError> {
    let Some(compatibility) = artifact.compatibility.as_deref() else {
        return Ok(None);
    };

    let expression = CompatibilityExpression::parse(compatibility)?;
    if !expression.test(platform) && !loose {
        return Ok(None);
    }

    if is_unspecified(&artifact.version) {
        return Ok(None);
    }

    parse_loose(&artifact.version).map(Some)
}
