//! Vendor directory: presence checks and per-dependency acquisition.
//!
//! One `VendorDir` is shared by every check in a run. Acquisition of a single
//! dependency is the full lifecycle: presence check, download, extraction and
//! layout normalization, then unconditional deletion of the downloaded
//! archive. Re-running converges: satisfied dependencies are left untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::catalog::{ArtifactKind, Dependency};
use crate::download::download_file;
use crate::error::SetupError;
use crate::extract::install_archive;
use crate::output;

/// Result of one acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The presence check was satisfied; nothing was downloaded or written.
    AlreadySatisfied,
    /// The dependency was downloaded and installed in canonical layout.
    Installed,
}

/// Handle to the local directory third-party dependencies install into.
#[derive(Debug, Clone)]
pub struct VendorDir {
    root: PathBuf,
}

impl VendorDir {
    /// Open the vendor directory, creating it if absent.
    pub fn ensure(root: impl Into<PathBuf>) -> Result<Self, SetupError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| SetupError::presence(&root, e))?;
        Ok(Self { root })
    }

    /// Wrap a vendor root without creating anything. Presence checks against
    /// a missing root report every dependency as not installed.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Presence check: installed iff the versioned directory or the bare
    /// executable exists at the vendor root. Pure predicate, no side effects.
    pub fn is_installed(&self, dep: &Dependency) -> Result<bool, SetupError> {
        let dir = self.root.join(dep.install_dir_name());
        if metadata_exists(&dir)?.is_some_and(|m| m.is_dir()) {
            return Ok(true);
        }
        let exe = self.root.join(dep.exe_name());
        Ok(metadata_exists(&exe)?.is_some())
    }

    /// Acquire one dependency: skip if present, otherwise download, extract,
    /// normalize layout, and delete the downloaded archive.
    pub fn acquire(&self, dep: &Dependency) -> Result<AcquireOutcome, SetupError> {
        if self.is_installed(dep)? {
            return Ok(AcquireOutcome::AlreadySatisfied);
        }

        let kind = dep.artifact().ok_or_else(|| {
            SetupError::extraction(format!(
                "cannot detect artifact format for {}: {}",
                dep.name, dep.source_url
            ))
        })?;

        match kind {
            // Bare executable: download to a partial path and rename into
            // place only on success, so a truncated download never sits at
            // the path the presence check looks for.
            ArtifactKind::Executable => {
                let dest = self.root.join(dep.exe_name());
                let partial = self.root.join(format!("{}.partial", dep.exe_name()));

                if let Err(e) = download_file(&dep.source_url, &partial) {
                    if let Err(e) = fs::remove_file(&partial) {
                        if e.kind() != ErrorKind::NotFound {
                            output::warning(&format!(
                                "could not delete {}: {}",
                                partial.display(),
                                e
                            ));
                        }
                    }
                    return Err(e);
                }

                fs::rename(&partial, &dest).map_err(|e| {
                    SetupError::extraction(format!("cannot install {}: {}", dest.display(), e))
                })?;
            }
            ArtifactKind::Archive(format) => {
                let archive = self.root.join(dep.archive_file_name(format));
                let result = download_file(&dep.source_url, &archive).and_then(|_| {
                    output::detail(&format!(
                        "extracting into {}",
                        self.root.join(dep.install_dir_name()).display()
                    ));
                    install_archive(&archive, format, &self.root, &dep.name, &dep.install_dir_name())
                });

                // The archive is ephemeral: delete it whether or not
                // extraction succeeded. Best-effort only.
                if let Err(e) = fs::remove_file(&archive) {
                    if e.kind() != ErrorKind::NotFound {
                        output::warning(&format!(
                            "could not delete {}: {}",
                            archive.display(),
                            e
                        ));
                    }
                }

                result?;
            }
        }

        Ok(AcquireOutcome::Installed)
    }
}

/// Metadata lookup that maps NotFound to None and keeps other IO errors,
/// so a real filesystem failure surfaces instead of reading as "missing".
fn metadata_exists(path: &Path) -> Result<Option<fs::Metadata>, SetupError> {
    match fs::metadata(path) {
        Ok(m) => Ok(Some(m)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SetupError::presence(path, e)),
    }
}
