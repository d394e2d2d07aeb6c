// Package resolver: host path handling for volumes and local descriptors.

use std::path::PathBuf;

/// Placeholders replaced by the current user's home directory.
const HOME_PLACEHOLDERS: &[&str] = &["%USERPROFILE%", "$HOME", "~"];

/// Substitutes a leading home placeholder. Paths without one are returned unchanged.
pub fn expand_home(path: &str) -> String {
    for placeholder in HOME_PLACEHOLDERS {
        if let Some(rest) = path.strip_prefix(placeholder) {
            if let Some(home) = dirs::home_dir() {
                let rest = rest.trim_start_matches(['/', '\\']);
                return home.join(rest).to_string_lossy().into_owned();
            }
        }
    }
    path.to_string()
}

/// Splits a `host:container[:mode]` bind into its host part and the remainder.
pub fn split_bind(bind: &str) -> (&str, Option<&str>) {
    match bind.split_once(':') {
        Some((host, rest)) => (host, Some(rest)),
        None => (bind, None),
    }
}

/// Expands the host part of a bind. Returns the rewritten bind and its host path.
pub fn expand_bind(bind: &str) -> (String, PathBuf) {
    let (host, rest) = split_bind(bind.trim());
    let host = expand_home(host);
    let path = PathBuf::from(&host);
    let bind = match rest {
        Some(rest) => format!("{}:{}", host, rest),
        None => host,
    };
    (bind, path)
}
