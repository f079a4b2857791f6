//! Top-level error type for the tool
//!
//! Every failure is fatal for the run. [`ToolError::kind`] names the
//! category so the user can tell an input problem from an output problem.

use pkgm_deps::{DepsError, EvalError};
use pkgm_manifest::ManifestError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Deps(#[from] DepsError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("manifest {} does not list the projects it was generated from", path.display())]
    Verify { path: PathBuf },
}

/// Failure categories reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputNotFound,
    DeclarationParse,
    UndefinedVariable,
    MalformedReference,
    OutputWrite,
    ManifestRead,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputNotFound => "InputNotFoundError",
            ErrorKind::DeclarationParse => "DeclarationParseError",
            ErrorKind::UndefinedVariable => "UndefinedVariableError",
            ErrorKind::MalformedReference => "MalformedReferenceError",
            ErrorKind::OutputWrite => "OutputWriteError",
            ErrorKind::ManifestRead => "ManifestReadError",
        };
        write!(f, "{}", name)
    }
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Deps(DepsError::Read { .. }) => ErrorKind::InputNotFound,
            ToolError::Deps(DepsError::Evaluate {
                source: EvalError::UndefinedVariable { .. },
                ..
            }) => ErrorKind::UndefinedVariable,
            ToolError::Deps(DepsError::Evaluate { .. }) => ErrorKind::DeclarationParse,
            ToolError::Manifest(
                ManifestError::MalformedReference { .. } | ManifestError::NotAString { .. },
            ) => ErrorKind::MalformedReference,
            ToolError::Manifest(ManifestError::Write { .. }) => ErrorKind::OutputWrite,
            ToolError::Manifest(ManifestError::Read { .. } | ManifestError::Parse(_))
            | ToolError::Verify { .. } => ErrorKind::ManifestRead,
        }
    }
}
