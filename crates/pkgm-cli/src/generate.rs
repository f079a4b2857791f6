//! The DEPS to manifest pipeline

use pkgm_logger as logger;
use pkgm_manifest::{read_from_path, write_to_path, Manifest, PathFilter};
use std::path::PathBuf;
use tracing::info;

use crate::config::ToolPaths;
use crate::errors::ToolError;

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Entries in the declaration file's `deps`
    pub resolved: usize,
    /// Entries written to the manifest
    pub selected: usize,
    pub output: PathBuf,
}

/// Evaluate the declaration file, select and rewrite its packages, and
/// write the manifest
///
/// The output file is only touched once every reference has been split
/// successfully. The written file is read back and must list exactly the
/// projects it was generated from.
pub fn generate(paths: &ToolPaths, filter: &PathFilter) -> Result<GenerateReport, ToolError> {
    logger::step(&format!("Evaluating {}", paths.deps.display()));
    let deps = pkgm_deps::load_dependencies(&paths.deps)?;
    logger::debug(&format!("Resolved {} dependencies", deps.len()));

    logger::step(&format!("Selecting paths containing '{}'", filter.marker));
    let selected = filter.apply(&deps);
    if selected.is_empty() {
        logger::debug("No dependencies matched; writing an empty manifest");
    }

    let manifest = Manifest::from_dependencies(&selected)?;

    logger::step(&format!("Writing {}", paths.output.display()));
    write_to_path(&manifest, &paths.output)?;

    logger::step(&format!("Verifying {}", paths.output.display()));
    if read_from_path(&paths.output)? != manifest {
        return Err(ToolError::Verify {
            path: paths.output.clone(),
        });
    }
    info!(
        resolved = deps.len(),
        selected = manifest.len(),
        "Manifest generated"
    );

    Ok(GenerateReport {
        resolved: deps.len(),
        selected: manifest.len(),
        output: paths.output.clone(),
    })
}
