//! Sandbox path helpers.
//!
//! Inside a Zellij plugin the host filesystem is mounted under `/host`, which
//! usually resolves to the directory Zellij was started from (typically the
//! user's home).

use std::path::PathBuf;

const HOST_ROOT: &str = "/host";

/// Directory holding the span log, `/host/.local/share/zellij/listgrid`.
///
/// ```
/// use listgrid::infrastructure::get_data_dir;
///
/// assert_eq!(get_data_dir().to_str(), Some("/host/.local/share/zellij/listgrid"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(HOST_ROOT).join(".local/share/zellij").join("listgrid")
}

/// Rewrites a leading `~` to the sandbox host root. Other paths pass through.
///
/// ```
/// use listgrid::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/.config/listgrid/keys.toml"), "/host/.config/listgrid/keys.toml");
/// assert_eq!(expand_tilde("/etc/keys.toml"), "/etc/keys.toml");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    match path.strip_prefix('~') {
        Some("") => HOST_ROOT.to_string(),
        Some(rest) if rest.starts_with('/') => format!("{HOST_ROOT}{rest}"),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_only() {
        assert_eq!(expand_tilde("~"), "/host");
        assert_eq!(expand_tilde("~/keys.toml"), "/host/keys.toml");
        assert_eq!(expand_tilde("~other/keys.toml"), "~other/keys.toml");
        assert_eq!(expand_tilde("keys.toml"), "keys.toml");
    }

    #[test]
    fn data_dir_is_under_host() {
        assert!(get_data_dir().starts_with("/host"));
        assert!(get_data_dir().ends_with("listgrid"));
    }
}
