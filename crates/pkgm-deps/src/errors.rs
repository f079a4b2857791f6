use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing or evaluating declaration text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Var is not defined: {name} (line {line})")]
    UndefinedVariable { name: String, line: usize },

    #[error("name '{name}' is not defined (line {line})")]
    UndefinedName { name: String, line: usize },

    #[error("unsupported call to '{name}' (line {line}); only Var(...) is allowed")]
    UnsupportedCall { name: String, line: usize },

    #[error("type mismatch at line {line}: {message}")]
    TypeMismatch { line: usize, message: String },
}

impl EvalError {
    pub(crate) fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        EvalError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(line: usize, message: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            line,
            message: message.into(),
        }
    }
}

/// Errors raised while loading a declaration file from disk
#[derive(Error, Debug)]
pub enum DepsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to evaluate {}: {source}", path.display())]
    Evaluate {
        path: PathBuf,
        #[source]
        source: EvalError,
    },
}
