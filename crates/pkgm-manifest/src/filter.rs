//! Selection of the dependencies that go into the manifest
//!
//! The declaration file describes the SDK checkout, where packages live
//! under `sdk/third_party/pkg`. In the consuming tree the SDK is mounted as
//! `dart`, so selected paths are rewritten before they are written out.

use pkgm_deps::DependencyMap;
use tracing::debug;

/// Substring a dependency path must contain to be selected
pub const THIRD_PARTY_PKG_MARKER: &str = "sdk/third_party/pkg";
/// Leading namespace in the declaration file
pub const SOURCE_NAMESPACE: &str = "sdk";
/// Namespace used in the generated manifest
pub const TARGET_NAMESPACE: &str = "dart";

/// Inclusion predicate plus key rewrite applied to a dependency map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    pub marker: String,
    pub from: String,
    pub to: String,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            marker: THIRD_PARTY_PKG_MARKER.to_string(),
            from: SOURCE_NAMESPACE.to_string(),
            to: TARGET_NAMESPACE.to_string(),
        }
    }
}

impl PathFilter {
    pub fn matches(&self, key: &str) -> bool {
        key.contains(&self.marker)
    }

    /// Replace the first occurrence of `from` with `to`
    pub fn rewrite(&self, key: &str) -> String {
        key.replacen(&self.from, &self.to, 1)
    }

    /// Keep the matching entries under their rewritten keys
    ///
    /// Values are untouched. No match yields an empty map.
    pub fn apply(&self, deps: &DependencyMap) -> DependencyMap {
        let filtered: DependencyMap = deps
            .iter()
            .filter(|(key, _)| self.matches(key))
            .map(|(key, value)| (self.rewrite(key), value.clone()))
            .collect();

        debug!(
            "Selected {} of {} dependencies containing '{}'",
            filtered.len(),
            deps.len(),
            self.marker
        );
        filtered
    }
}
