//! Bootstrap toolchain for the Vulkan engine workspace.
//!
//! Checks for a native Vulkan SDK installation, downloads and unpacks the
//! fixed set of third-party libraries into `./vendor`, normalizes their
//! folder layout, and invokes the bundled premake executable to generate an
//! IDE solution.
//!
//! Installed layout contract consumed by the premake scripts:
//!
//! ```text
//! vendor/{name}-{version}/{name}/...   archive-based packages
//! vendor/{name}.exe                    bare executables (premake itself)
//! ```
//!
//! Dependencies are processed sequentially and independently: a failure on
//! one entry is reported and the next entry is still attempted. Re-running
//! the tool is the recovery mechanism; anything already installed is left
//! untouched.

pub mod catalog;
pub mod download;
pub mod error;
pub mod extract;
pub mod generator;
pub mod output;
pub mod sdk;
pub mod vendor;

pub use catalog::{default_catalog, ArchiveFormat, ArtifactKind, Dependency};
pub use error::SetupError;
pub use extract::{ArchiveLayout, InstalledArtifact};
pub use generator::run_generator;
pub use sdk::{check_sdk, SDK_ENV_VAR};
pub use vendor::{AcquireOutcome, VendorDir};
