//! create-pkg-manifest library - expose modules for testing
//!
//! Reads a DEPS file, keeps the dependencies under `sdk/third_party/pkg`,
//! and writes them as a jiri manifest rooted at `dart/third_party/pkg`.

pub mod common;
pub mod config;
pub mod errors;
pub mod generate;
