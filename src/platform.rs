use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, PlatformError};

/// Platform keys accepted at registration time.
pub const ALLOWED_PLATFORMS: &[&str] = &["ubuntu", "arch", "windows", "macos"];

/// Target operating system / distribution for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ubuntu,
    Arch,
    Windows,
    Macos,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ubuntu => write!(f, "ubuntu"),
            Self::Arch => write!(f, "arch"),
            Self::Windows => write!(f, "windows"),
            Self::Macos => write!(f, "macos"),
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ubuntu" => Ok(Self::Ubuntu),
            "arch" => Ok(Self::Arch),
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::Macos),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

impl Platform {
    /// Detect the current platform.
    ///
    /// On Linux the distribution id from `/etc/os-release` is used; elsewhere
    /// the OS name. The result is matched against the platform allow-list so
    /// that running on an unsupported distribution fails loudly instead of
    /// silently dispatching nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot be identified or the identified
    /// name is not in the allow-list.
    pub fn detect() -> Result<Self, PlatformError> {
        let name = os_name()?;
        name.parse().map_err(|_| PlatformError::Unsupported(name))
    }

    /// Whether handlers for this platform run under a Linux userland.
    #[must_use]
    pub const fn is_linux(self) -> bool {
        matches!(self, Self::Ubuntu | Self::Arch)
    }

    /// Whether privilege escalation via sudo applies on this platform.
    #[must_use]
    pub const fn has_sudo(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

/// Lowercase name of the running OS: the distribution id on Linux
/// (from `/etc/os-release`), the OS name otherwise.
///
/// # Errors
///
/// Returns an error on Linux when `/etc/os-release` is unreadable or has no
/// `ID=` line, and on operating systems the tool does not know about.
pub fn os_name() -> Result<String, PlatformError> {
    if cfg!(target_os = "linux") {
        let contents = std::fs::read_to_string("/etc/os-release")
            .map_err(|e| PlatformError::DetectionFailed(format!("/etc/os-release: {e}")))?;
        os_release_id(&contents).ok_or_else(|| {
            PlatformError::DetectionFailed("no ID= line in /etc/os-release".to_string())
        })
    } else if cfg!(target_os = "macos") {
        Ok("macos".to_string())
    } else if cfg!(target_os = "windows") {
        Ok("windows".to_string())
    } else {
        Err(PlatformError::DetectionFailed(
            std::env::consts::OS.to_string(),
        ))
    }
}

/// Extract the lowercase `ID=` value from `/etc/os-release` contents.
fn os_release_id(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|id| id.trim().trim_matches('"').to_ascii_lowercase())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn platform_display_is_lowercase() {
        assert_eq!(Platform::Ubuntu.to_string(), "ubuntu");
        assert_eq!(Platform::Arch.to_string(), "arch");
        assert_eq!(Platform::Windows.to_string(), "windows");
        assert_eq!(Platform::Macos.to_string(), "macos");
    }

    #[test]
    fn platform_parses_allow_list() {
        for name in ALLOWED_PLATFORMS {
            let platform: Platform = name.parse().unwrap();
            assert_eq!(platform.to_string(), *name, "round-trip for {name}");
        }
    }

    #[test]
    fn platform_rejects_fedora() {
        let err = "fedora".parse::<Platform>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPlatform(ref p) if p == "fedora"));
    }

    #[test]
    fn platform_parse_is_case_sensitive() {
        assert!("Ubuntu".parse::<Platform>().is_err());
    }

    #[test]
    fn is_linux_covers_distros_only() {
        assert!(Platform::Ubuntu.is_linux());
        assert!(Platform::Arch.is_linux());
        assert!(!Platform::Windows.is_linux());
        assert!(!Platform::Macos.is_linux());
    }

    #[test]
    fn has_sudo_excludes_windows() {
        assert!(Platform::Ubuntu.has_sudo());
        assert!(Platform::Macos.has_sudo());
        assert!(!Platform::Windows.has_sudo());
    }

    #[test]
    fn os_release_id_plain() {
        let contents = "NAME=\"Ubuntu\"\nID=ubuntu\nVERSION_ID=\"24.04\"\n";
        assert_eq!(os_release_id(contents), Some("ubuntu".to_string()));
    }

    #[test]
    fn os_release_id_quoted_and_mixed_case() {
        let contents = "ID=\"Arch\"\n";
        assert_eq!(os_release_id(contents), Some("arch".to_string()));
    }

    #[test]
    fn os_release_id_missing() {
        assert_eq!(os_release_id("NAME=Something\n"), None);
    }

    #[test]
    fn os_release_id_does_not_match_id_like() {
        // ID_LIKE must not satisfy the ID= lookup
        let contents = "ID_LIKE=debian\nID=ubuntu\n";
        assert_eq!(os_release_id(contents), Some("ubuntu".to_string()));
    }
}
