// Package lifecycle: container names and the patterns that select them.
//
// Management modules are platform-wide and get a fixed name. Every other
// container is scoped by profile so one module can run under several
// profiles side by side.

use crate::model::{is_management, SIDECAR_SUFFIX};

pub const NAME_PREFIX: &str = "eureka";

/// Runtime name of the container for `name` (a module or sidecar name).
pub fn container_name(profile: &str, name: &str) -> String {
    if is_management(name) {
        format!("{}-{}", NAME_PREFIX, name)
    } else {
        format!("{}-{}-{}", NAME_PREFIX, profile, name)
    }
}

/// Anchored pattern matching the module container and its sidecar.
///
/// Runtimes report names with a leading `/`, hence the optional slash.
pub fn pair_pattern(profile: &str, module_name: &str) -> String {
    if is_management(module_name) {
        return format!("^/?{}$", regex::escape(&container_name(profile, module_name)));
    }
    format!(
        "^/?{}({})?$",
        regex::escape(&container_name(profile, module_name)),
        regex::escape(SIDECAR_SUFFIX)
    )
}

/// Profile names must not contain `-`, otherwise `eureka-<profile>-` would
/// also select containers of a profile named `<profile>-<suffix>`.
pub fn is_valid_profile(profile: &str) -> bool {
    !profile.is_empty() && profile.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Pattern matching every profile-scoped container of `profile`.
pub fn profile_pattern(profile: &str) -> String {
    format!("^/?{}-", regex::escape(&format!("{}-{}", NAME_PREFIX, profile)))
}

/// Pattern matching exactly one container name.
pub fn exact_pattern(container: &str) -> String {
    format!("^/?{}$", regex::escape(container))
}

/// Pattern matching every management container.
pub fn management_pattern() -> String {
    format!(
        "^/?{}",
        regex::escape(&format!("{}-{}", NAME_PREFIX, crate::model::MANAGEMENT_PREFIX))
    )
}
