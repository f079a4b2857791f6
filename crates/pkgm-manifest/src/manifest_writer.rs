//! Manifest rendering and atomic writes
//!
//! The output shape is fixed so that generated files diff cleanly between
//! runs: same warning, same indentation, projects sorted by path.

use quick_xml::escape::escape;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::types::{Manifest, Project};

/// First line of every generated manifest
pub const GENERATED_WARNING: &str =
    "<!-- This file is generated by create-pkg-manifest. DO NOT EDIT -->";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render the manifest document
pub fn render(manifest: &Manifest) -> String {
    let mut projects: Vec<&Project> = manifest.projects.iter().collect();
    projects.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::new();
    out.push_str(GENERATED_WARNING);
    out.push('\n');
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str("<manifest>\n");
    out.push_str("  <projects>\n");
    for project in projects {
        out.push_str(&format!(
            "    <project name=\"{}\" path=\"{}\" remote=\"{}\" revision=\"{}\"/>\n",
            escape(project.name.as_str()),
            escape(project.path.as_str()),
            escape(project.remote.as_str()),
            escape(project.revision.as_str()),
        ));
    }
    out.push_str("  </projects>\n");
    out.push_str("</manifest>\n");
    out
}

/// Write the manifest to `output_path`, replacing any existing file
///
/// The document is written to a temporary file next to the destination and
/// renamed over it, so a failed run leaves the previous file untouched.
/// When `output_path` is a symlink the file it points to is replaced and the
/// link itself is kept. A dangling link is replaced by a regular file.
pub fn write_to_path(manifest: &Manifest, output_path: &Path) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    let content = render(manifest);
    let write_error = |source: io::Error| ManifestError::Write {
        path: output_path.to_path_buf(),
        source,
    };

    let target = resolve_target(output_path);
    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    // Temp files are created owner-only; keep the mode a plain write would give
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&target)
            .map(|m| m.permissions().mode())
            .unwrap_or(0o644);
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(mode)).map_err(write_error)?;
    }

    temp.persist(&target)
        .map_err(|err| write_error(err.error))?;

    info!("Manifest written successfully to: {:?}", output_path);
    info!("Total projects: {}", manifest.len());

    Ok(())
}

/// The file a write to `path` lands in
fn resolve_target(path: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    if is_link {
        if let Ok(resolved) = fs::canonicalize(path) {
            debug!("Following symlink {:?} to {:?}", path, resolved);
            return resolved;
        }
    }
    path.to_path_buf()
}
