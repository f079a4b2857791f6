//! Jiri manifest generation
//!
//! Takes the resolved dependency map of a DEPS file, keeps the packages that
//! live under `sdk/third_party/pkg`, remaps them into the `dart` tree and
//! writes them out as a fixed-shape XML manifest:
//!
//! ```xml
//! <manifest>
//!   <projects>
//!     <project name="PATH" path="PATH" remote="URL" revision="REV"/>
//!   </projects>
//! </manifest>
//! ```

pub mod errors;
pub mod filter;
pub mod manifest_reader;
pub mod manifest_writer;
pub mod types;

pub use errors::ManifestError;
pub use filter::PathFilter;
pub use types::{Manifest, PinnedRef, Project};

pub use manifest_reader::{parse_manifest, read_from_path};
pub use manifest_writer::{render, write_to_path};
