use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, writing or reading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("malformed reference for '{path}': '{value}' has no '@' between remote and revision")]
    MalformedReference { path: String, value: String },

    #[error("malformed reference for '{path}': expected a '<remote>@<revision>' string, found {found}")]
    NotAString { path: String, found: &'static str },

    #[error("failed to write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] quick_xml::DeError),
}
