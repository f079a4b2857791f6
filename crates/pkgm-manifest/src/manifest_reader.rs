//! Reading generated manifests back
//!
//! Used to verify that a written manifest lists exactly the projects it was
//! built from.

use quick_xml::de::from_str;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::ManifestError;
use crate::types::{Manifest, Project};

#[derive(Debug, Deserialize)]
#[serde(rename = "manifest")]
struct ManifestDocument {
    #[serde(default)]
    projects: ProjectsElement,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectsElement {
    #[serde(default, rename = "project")]
    entries: Vec<ProjectElement>,
}

#[derive(Debug, Deserialize)]
struct ProjectElement {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@path")]
    path: String,
    #[serde(rename = "@remote")]
    remote: String,
    #[serde(rename = "@revision")]
    revision: String,
}

impl From<ProjectElement> for Project {
    fn from(element: ProjectElement) -> Self {
        Project {
            name: element.name,
            path: element.path,
            remote: element.remote,
            revision: element.revision,
        }
    }
}

/// Parse manifest XML; projects keep their document order
pub fn parse_manifest(xml: &str) -> Result<Manifest, ManifestError> {
    let document: ManifestDocument = from_str(xml)?;
    Ok(Manifest {
        projects: document
            .projects
            .entries
            .into_iter()
            .map(Project::from)
            .collect(),
    })
}

/// Read a manifest from disk
pub fn read_from_path(manifest_path: &Path) -> Result<Manifest, ManifestError> {
    debug!("Reading manifest from: {:?}", manifest_path);

    let content = fs::read_to_string(manifest_path).map_err(|source| ManifestError::Read {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let manifest = parse_manifest(&content)?;

    debug!("Manifest lists {} projects", manifest.len());
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use crate::manifest_reader::*;
    use crate::manifest_writer::render;
    use pkgm_deps::{DependencyMap, Value};
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_generated_manifest() {
        let xml = r#"<!-- This file is generated by create-pkg-manifest. DO NOT EDIT -->
<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <projects>
    <project name="dart/third_party/pkg/foo" path="dart/third_party/pkg/foo" remote="https://example.com/foo" revision="abc123"/>
  </projects>
</manifest>
"#;
        let manifest = parse_manifest(xml).unwrap_or_default();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.projects[0].path, "dart/third_party/pkg/foo");
        assert_eq!(manifest.projects[0].remote, "https://example.com/foo");
        assert_eq!(manifest.projects[0].revision, "abc123");
    }

    #[test]
    fn test_parse_empty_projects() {
        let manifest = parse_manifest(&render(&Manifest::default()));
        assert!(manifest.is_ok_and(|m| m.is_empty()));
    }

    #[test]
    fn test_round_trip_recovers_triples() {
        let deps: DependencyMap = [
            ("dart/third_party/pkg/z", "https://e.com/z.git@9"),
            ("dart/third_party/pkg/a", "https://e.com/a.git@1"),
            ("dart/third_party/pkg/amp", "https://e.com/x?y=1&z=2@r&d"),
        ]
        .into_iter()
        .map(|(path, reference)| (path.to_string(), Value::Str(reference.to_string())))
        .collect();

        let manifest = Manifest::from_dependencies(&deps).unwrap_or_default();
        let parsed = parse_manifest(&render(&manifest)).unwrap_or_default();

        let triples = |m: &Manifest| -> BTreeSet<(String, String, String)> {
            m.projects
                .iter()
                .map(|p| (p.path.clone(), p.remote.clone(), p.revision.clone()))
                .collect()
        };
        assert_eq!(parsed.len(), 3);
        assert_eq!(triples(&parsed), triples(&manifest));
    }

    #[test]
    fn test_missing_attribute_is_parse_error() {
        let xml = r#"<manifest><projects><project name="a" path="a"/></projects></manifest>"#;
        assert!(matches!(parse_manifest(xml), Err(ManifestError::Parse(_))));
    }
}
