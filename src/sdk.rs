//! Native SDK environment probe.
//!
//! The Vulkan SDK cannot be vendored; its installer exports `VULKAN_SDK`.
//! A missing variable fails the overall run (the remaining dependencies are
//! still processed) and the error points the user at the installer.

use std::path::PathBuf;

use crate::error::SetupError;

/// Environment variable exported by the Vulkan SDK installer.
pub const SDK_ENV_VAR: &str = "VULKAN_SDK";

/// Where to get the SDK when the probe fails.
pub const SDK_INSTALL_HINT: &str = "https://vulkan.lunarg.com/";

/// Check for an active Vulkan SDK installation.
///
/// Returns the SDK root on success.
pub fn check_sdk() -> Result<PathBuf, SetupError> {
    probe(SDK_ENV_VAR)
}

fn probe(var: &'static str) -> Result<PathBuf, SetupError> {
    match std::env::var_os(var) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(SetupError::MissingSdk {
            var,
            hint: SDK_INSTALL_HINT,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_set_variable() {
        // PATH is set in any test environment.
        let result = probe("PATH");
        assert!(result.is_ok());
    }

    #[test]
    fn test_probe_missing_variable() {
        let err = probe("VULKAN_BOOTSTRAP_TEST_UNSET_VAR").unwrap_err();
        assert!(matches!(err, SetupError::MissingSdk { .. }));
        let msg = err.to_string();
        assert!(msg.contains("VULKAN_BOOTSTRAP_TEST_UNSET_VAR"));
        assert!(msg.contains(SDK_INSTALL_HINT));
    }
}
