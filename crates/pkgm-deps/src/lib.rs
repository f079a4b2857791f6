//! DEPS declaration evaluator
//!
//! Declaration files describe dependency pins as a handful of top-level
//! bindings (`vars`, `deps`, `deps_os`, `hooks`, ...). This crate parses the
//! small expression subset those files use and recovers the `deps` mapping
//! with every `Var(...)` lookup resolved:
//!
//! 1. [`parser`] parses the text with ast-grep's Python grammar and lowers
//!    the top-level assignments into a small expression tree
//! 2. [`eval`] executes them in order against a [`Scope`]
//!
//! Nothing outside that subset is executed.

pub mod errors;
pub mod eval;
pub mod parser;
pub mod types;

pub use errors::{DepsError, EvalError};
pub use eval::{evaluate_deps, Scope};
pub use types::{DependencyMap, Value};

use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Read and evaluate a declaration file
pub fn load_dependencies(path: &Path) -> Result<DependencyMap, DepsError> {
    debug!("Reading declaration file: {:?}", path);

    let content = fs::read_to_string(path).map_err(|source| DepsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let deps = evaluate_deps(&content).map_err(|source| DepsError::Evaluate {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loaded {} dependencies from {:?}", deps.len(), path);
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_dependencies_from_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let deps_path = temp_dir.path().join("DEPS");
        let written = fs::write(
            &deps_path,
            "vars = {'rev': 'v1'}\ndeps = {'sdk/third_party/pkg/a': 'https://example.com/a@' + Var('rev')}\n",
        );
        assert!(written.is_ok(), "Failed to write DEPS fixture");

        let deps = load_dependencies(&deps_path);
        assert!(deps.is_ok_and(|d| d.len() == 1));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = load_dependencies(&temp_dir.path().join("DEPS"));
        assert!(matches!(result, Err(DepsError::Read { .. })));
    }

    #[test]
    fn test_parse_failure_carries_path() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let deps_path = temp_dir.path().join("DEPS");
        assert!(fs::write(&deps_path, "deps = {\n").is_ok());

        match load_dependencies(&deps_path) {
            Err(DepsError::Evaluate { path, source }) => {
                assert_eq!(path, deps_path);
                assert!(matches!(source, EvalError::Syntax { .. }));
            }
            other => unreachable!("expected evaluation error, got {:?}", other),
        }
    }
}
