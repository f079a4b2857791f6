use pkgm_deps::{DependencyMap, Value};

use crate::errors::ManifestError;

/// A remote location pinned to an immutable revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedRef {
    pub remote: String,
    pub revision: String,
}

impl PinnedRef {
    /// Split `value` at its first `@` into remote and revision
    ///
    /// `path` only serves to identify the offending entry in the error.
    pub fn parse(path: &str, value: &str) -> Result<Self, ManifestError> {
        let (remote, revision) =
            value
                .split_once('@')
                .ok_or_else(|| ManifestError::MalformedReference {
                    path: path.to_string(),
                    value: value.to_string(),
                })?;

        Ok(Self {
            remote: remote.to_string(),
            revision: revision.to_string(),
        })
    }
}

/// One `<project>` entry of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    pub name: String,
    pub path: String,
    pub remote: String,
    pub revision: String,
}

impl Project {
    /// Build a project checked out at `path` from its declared value
    pub fn from_dependency(path: &str, value: &Value) -> Result<Self, ManifestError> {
        let Value::Str(reference) = value else {
            return Err(ManifestError::NotAString {
                path: path.to_string(),
                found: value.type_name(),
            });
        };
        let pinned = PinnedRef::parse(path, reference)?;
        Ok(Self {
            name: path.to_string(),
            path: path.to_string(),
            remote: pinned.remote,
            revision: pinned.revision,
        })
    }
}

/// The projects listed in a generated manifest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub projects: Vec<Project>,
}

impl Manifest {
    /// Build a manifest from local path to pinned reference
    ///
    /// Fails on the first value that is not a `<remote>@<revision>` string;
    /// nothing is written in that case since this runs before any output is
    /// produced. Projects follow the map's path order.
    pub fn from_dependencies(deps: &DependencyMap) -> Result<Self, ManifestError> {
        let projects = deps
            .iter()
            .map(|(path, value)| Project::from_dependency(path, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { projects })
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
