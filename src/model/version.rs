// Package model computes the next version of a module for in-place upgrades.

use semver::{BuildMetadata, Prerelease, Version};

const SNAPSHOT: &str = "SNAPSHOT";

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("invalid module version {version:?}: {source}")]
    Invalid {
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// Returns the upgrade version of `current`.
///
/// Releases bump the patch number (`2.1.0` -> `2.1.1`). Snapshots keep the
/// patch and bump the numeric snapshot build suffix
/// (`2.1.0-SNAPSHOT.7` -> `2.1.0-SNAPSHOT.8`, `2.1.0-SNAPSHOT` -> `2.1.0-SNAPSHOT.1`).
pub fn next_version(current: &str) -> Result<String, VersionError> {
    let invalid = |source| VersionError::Invalid {
        version: current.to_string(),
        source,
    };

    let mut version = Version::parse(current.trim()).map_err(invalid)?;
    version.build = BuildMetadata::EMPTY;

    if !is_snapshot(&version) {
        version.patch += 1;
        version.pre = Prerelease::EMPTY;
        return Ok(version.to_string());
    }

    let mut parts: Vec<String> = version.pre.as_str().split('.').map(str::to_string).collect();
    let bumped = parts
        .last()
        .and_then(|last| last.parse::<u64>().ok())
        .map(|n| n + 1);
    match bumped {
        Some(n) => {
            if let Some(last) = parts.last_mut() {
                *last = n.to_string();
            }
        }
        None => parts.push("1".to_string()),
    }

    version.pre = Prerelease::new(&parts.join(".")).map_err(invalid)?;
    Ok(version.to_string())
}

fn is_snapshot(version: &Version) -> bool {
    version
        .pre
        .as_str()
        .split('.')
        .any(|part| part.eq_ignore_ascii_case(SNAPSHOT))
}
