//! Input and output locations
//!
//! Both paths default to fixed names in the project root, which is the
//! directory the tool is run from.

use std::env;
use std::path::{Path, PathBuf};

/// Default declaration file name
pub const DEFAULT_DEPS_FILE: &str = "DEPS";
/// Default manifest file name
pub const DEFAULT_MANIFEST_FILE: &str = "dart_third_party_pkg.manifest";

/// Resolved input and output paths for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub deps: PathBuf,
    pub output: PathBuf,
}

impl ToolPaths {
    /// Apply overrides on top of the defaults under `root`
    pub fn resolve(root: &Path, deps: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            deps: deps.unwrap_or_else(|| root.join(DEFAULT_DEPS_FILE)),
            output: output.unwrap_or_else(|| root.join(DEFAULT_MANIFEST_FILE)),
        }
    }

    /// Resolve against the current working directory
    pub fn from_overrides(deps: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self::resolve(&project_root(), deps, output)
    }
}

/// The project root; falls back to a relative `.` if the cwd is unavailable
pub fn project_root() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_defaults_live_in_root() {
        let paths = ToolPaths::resolve(Path::new("/work/sdk"), None, None);
        assert_eq!(paths.deps, PathBuf::from("/work/sdk/DEPS"));
        assert_eq!(
            paths.output,
            PathBuf::from("/work/sdk/dart_third_party_pkg.manifest")
        );
    }

    #[test]
    fn test_overrides_are_used_verbatim() {
        let paths = ToolPaths::resolve(
            Path::new("/work/sdk"),
            Some(PathBuf::from("other/DEPS")),
            Some(PathBuf::from("out.manifest")),
        );
        assert_eq!(paths.deps, PathBuf::from("other/DEPS"));
        assert_eq!(paths.output, PathBuf::from("out.manifest"));
    }
}
