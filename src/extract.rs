//! Archive extraction and install-layout normalization.
//!
//! Upstream archives arrive in whatever shape their project ships: a single
//! versioned root folder, a flat bag of files, or a bare executable. This
//! module extracts into a staging directory inside the vendor root, reshapes
//! the content to the layout the build scripts reference, and publishes the
//! result with a single rename. Nothing partially extracted ever lands at the
//! vendor root.
//!
//! Canonical layouts after installation:
//! - `{name}-{version}/{name}/...` for archive-based packages
//! - `{name}.exe` at the vendor root for bare executables

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::catalog::ArchiveFormat;
use crate::error::SetupError;

/// Top-level shape of an extracted archive.
///
/// Detection looks at the whole extracted tree rather than the first archive
/// entry, so multi-root archives normalize correctly instead of silently
/// taking the first entry's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveLayout {
    /// Exactly one top-level directory that holds all content.
    SingleRoot(String),
    /// Multiple top-level entries, or a single top-level file.
    Flat,
}

impl ArchiveLayout {
    /// Detect the layout of an extracted tree. An empty tree means the
    /// archive had no entries and is rejected.
    pub fn detect(extracted: &Path) -> Result<Self, SetupError> {
        let mut entries = Vec::new();
        let read_dir = fs::read_dir(extracted).map_err(|e| {
            SetupError::extraction(format!("cannot read {}: {}", extracted.display(), e))
        })?;
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                SetupError::extraction(format!("cannot read {}: {}", extracted.display(), e))
            })?;
            entries.push(entry);
        }

        match entries.as_slice() {
            [] => Err(SetupError::extraction("archive is empty")),
            [only] if only.path().is_dir() => Ok(ArchiveLayout::SingleRoot(
                only.file_name().to_string_lossy().to_string(),
            )),
            _ => Ok(ArchiveLayout::Flat),
        }
    }
}

/// What an archive installation produced at the vendor root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledArtifact {
    /// `vendor/{name}-{version}` holding a nested `{name}` subdirectory.
    Directory(PathBuf),
    /// `vendor/{name}.exe`.
    Executable(PathBuf),
}

/// Extract `archive` and install it under `vendor_root` in canonical layout.
///
/// Extraction goes through a staging directory inside the vendor root so the
/// final publish is one atomic rename; on any failure the staging directory
/// is dropped and the vendor root is untouched.
pub fn install_archive(
    archive: &Path,
    format: ArchiveFormat,
    vendor_root: &Path,
    name: &str,
    name_with_version: &str,
) -> Result<InstalledArtifact, SetupError> {
    let stage = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(vendor_root)
        .map_err(|e| SetupError::extraction(format!("cannot create staging directory: {}", e)))?;

    match format {
        ArchiveFormat::Zip => extract_zip(archive, stage.path())?,
        ArchiveFormat::TarGz => extract_tar_gz(archive, stage.path())?,
    }

    // Bare executable shipped inside the archive (premake's zip does this):
    // install the staged files straight at the vendor root, no normalization.
    let exe_name = format!("{}.exe", name);
    if stage.path().join(&exe_name).is_file() {
        move_children(stage.path(), vendor_root, None)?;
        return Ok(InstalledArtifact::Executable(vendor_root.join(exe_name)));
    }

    let package_root = match ArchiveLayout::detect(stage.path())? {
        // The upstream root folder becomes the package root; renaming it
        // below decouples the project's canonical name from whatever the
        // archive happened to be called.
        ArchiveLayout::SingleRoot(root) => stage.path().join(root),
        ArchiveLayout::Flat => {
            let wrapped = stage.path().join(name_with_version);
            fs::create_dir(&wrapped).map_err(|e| {
                SetupError::extraction(format!("cannot create {}: {}", wrapped.display(), e))
            })?;
            move_children(stage.path(), &wrapped, Some(OsStr::new(name_with_version)))?;
            wrapped
        }
    };

    ensure_nested(&package_root, name)?;

    let final_dir = vendor_root.join(name_with_version);
    fs::rename(&package_root, &final_dir).map_err(|e| {
        SetupError::extraction(format!(
            "cannot install {}: {}",
            final_dir.display(),
            e
        ))
    })?;

    Ok(InstalledArtifact::Directory(final_dir))
}

/// Guarantee the nested-folder convention: `package_root/{name}/...`.
///
/// If a `{name}` subdirectory already exists the archive ships the
/// convention itself and must not be wrapped a second time. Otherwise every
/// direct child moves into a freshly created `{name}` subdirectory.
fn ensure_nested(package_root: &Path, name: &str) -> Result<(), SetupError> {
    let nested = package_root.join(name);
    if nested.is_dir() {
        return Ok(());
    }

    fs::create_dir(&nested).map_err(|e| {
        SetupError::extraction(format!("cannot create {}: {}", nested.display(), e))
    })?;
    move_children(package_root, &nested, Some(OsStr::new(name)))
}

/// Move every direct child of `from` into `to`, skipping the entry named
/// `skip` (used when `to` lives inside `from`).
fn move_children(from: &Path, to: &Path, skip: Option<&OsStr>) -> Result<(), SetupError> {
    let read_dir = fs::read_dir(from)
        .map_err(|e| SetupError::extraction(format!("cannot read {}: {}", from.display(), e)))?;

    for entry in read_dir {
        let entry = entry
            .map_err(|e| SetupError::extraction(format!("cannot read {}: {}", from.display(), e)))?;
        if skip.is_some_and(|s| entry.file_name() == s) {
            continue;
        }
        let dest = to.join(entry.file_name());
        fs::rename(entry.path(), &dest).map_err(|e| {
            SetupError::extraction(format!(
                "move failed: {} -> {}: {}",
                entry.path().display(),
                dest.display(),
                e
            ))
        })?;
    }

    Ok(())
}

// ============================================================================
// Native archive extraction (no external tools needed)
// ============================================================================

/// Extract a zip archive into `dest`.
fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), SetupError> {
    let file = File::open(archive_path).map_err(|e| {
        SetupError::extraction(format!("cannot open {}: {}", archive_path.display(), e))
    })?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| SetupError::extraction(format!("zip read error: {}", e)))?;

    if archive.len() == 0 {
        return Err(SetupError::extraction("archive is empty"));
    }

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| SetupError::extraction(format!("zip entry error: {}", e)))?;

        // Skip entries whose names would escape the destination.
        let outpath = match file.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if file.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| {
                SetupError::extraction(format!(
                    "cannot create directory {}: {}",
                    outpath.display(),
                    e
                ))
            })?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    SetupError::extraction(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let mut outfile = File::create(&outpath).map_err(|e| {
                SetupError::extraction(format!("cannot create {}: {}", outpath.display(), e))
            })?;
            std::io::copy(&mut file, &mut outfile).map_err(|e| {
                SetupError::extraction(format!("write error for {}: {}", outpath.display(), e))
            })?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).ok();
                }
            }
        }
    }

    Ok(())
}

/// Extract a tar.gz archive into `dest`.
fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), SetupError> {
    let file = File::open(archive_path).map_err(|e| {
        SetupError::extraction(format!("cannot open {}: {}", archive_path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let decoder = flate2::read::GzDecoder::new(reader);
    extract_tar(decoder, dest)
}

fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<(), SetupError> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive
        .entries()
        .map_err(|e| SetupError::extraction(format!("tar read error: {}", e)))?
    {
        let mut entry = entry.map_err(|e| SetupError::extraction(format!("tar entry error: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| SetupError::extraction(format!("tar path error: {}", e)))?
            .into_owned();

        // Reject paths that could escape the destination.
        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(SetupError::extraction(format!(
                "tar contains unsafe path: {}",
                path.display()
            )));
        }

        // Some archives contain a "." entry; treat it as a no-op.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        // Link targets must stay inside the destination too.
        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| SetupError::extraction(format!("tar link error: {}", e)))?;
            let unsafe_target = match &link_name {
                Some(target) => {
                    target.is_absolute()
                        || target
                            .components()
                            .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
                }
                None => true,
            };
            if unsafe_target {
                return Err(SetupError::extraction(format!(
                    "tar contains unsafe link target: {}",
                    path.display()
                )));
            }
        }

        let full_path = dest.join(&path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SetupError::extraction(format!(
                    "cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        entry.unpack(&full_path).map_err(|e| {
            SetupError::extraction(format!("unpack error for {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with_entries(dir: &Path, entries: &[(&str, Option<&str>)]) -> PathBuf {
        let archive_path = dir.join("test.zip");
        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, content) in entries {
            match content {
                Some(body) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(body.as_bytes()).unwrap();
                }
                None => {
                    writer.add_directory(*name, options).unwrap();
                }
            }
        }
        writer.finish().unwrap();
        archive_path
    }

    #[test]
    fn test_detect_layout_single_root() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("foo-1.0")).unwrap();
        fs::write(temp.path().join("foo-1.0/bar.txt"), "x").unwrap();

        let layout = ArchiveLayout::detect(temp.path()).unwrap();
        assert_eq!(layout, ArchiveLayout::SingleRoot("foo-1.0".to_string()));
    }

    #[test]
    fn test_detect_layout_flat_multiple_roots() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("b.txt"), "x").unwrap();

        assert_eq!(ArchiveLayout::detect(temp.path()).unwrap(), ArchiveLayout::Flat);
    }

    #[test]
    fn test_detect_layout_single_file_is_flat() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("only.txt"), "x").unwrap();

        assert_eq!(ArchiveLayout::detect(temp.path()).unwrap(), ArchiveLayout::Flat);
    }

    #[test]
    fn test_detect_layout_empty_tree_errors() {
        let temp = tempfile::tempdir().unwrap();
        let err = ArchiveLayout::detect(temp.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_ensure_nested_wraps_children() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("glfw-3.4");
        fs::create_dir_all(root.join("include")).unwrap();
        fs::write(root.join("README.md"), "x").unwrap();

        ensure_nested(&root, "glfw").unwrap();

        assert!(root.join("glfw/include").is_dir());
        assert!(root.join("glfw/README.md").is_file());
        assert!(!root.join("include").exists());
    }

    #[test]
    fn test_ensure_nested_keeps_existing_convention() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("pkgname-1.0");
        fs::create_dir_all(root.join("pkgname")).unwrap();
        fs::write(root.join("pkgname/file.txt"), "x").unwrap();

        ensure_nested(&root, "pkgname").unwrap();

        assert!(root.join("pkgname/file.txt").is_file());
        assert!(!root.join("pkgname/pkgname").exists());
    }

    #[test]
    fn test_install_single_root_zip() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(
            temp.path(),
            &[("foo-1.0/", None), ("foo-1.0/bar.txt", Some("hello"))],
        );

        let artifact =
            install_archive(&archive, ArchiveFormat::Zip, &vendor, "foo", "foo-1.0").unwrap();

        assert_eq!(artifact, InstalledArtifact::Directory(vendor.join("foo-1.0")));
        assert!(vendor.join("foo-1.0/foo").is_dir());
        assert_eq!(
            fs::read_to_string(vendor.join("foo-1.0/foo/bar.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_install_renames_upstream_root() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(
            temp.path(),
            &[(
                "glfw-3.4.bin.WIN64/include/glfw3.h",
                Some("// glfw header"),
            )],
        );

        install_archive(&archive, ArchiveFormat::Zip, &vendor, "glfw", "glfw-3.4").unwrap();

        assert!(vendor.join("glfw-3.4/glfw/include/glfw3.h").is_file());
        assert!(!vendor.join("glfw-3.4.bin.WIN64").exists());
    }

    #[test]
    fn test_install_does_not_double_nest() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(
            temp.path(),
            &[("pkgname/pkgname/file.txt", Some("content"))],
        );

        install_archive(
            &archive,
            ArchiveFormat::Zip,
            &vendor,
            "pkgname",
            "pkgname-1.0",
        )
        .unwrap();

        assert!(vendor.join("pkgname-1.0/pkgname/file.txt").is_file());
        assert!(!vendor.join("pkgname-1.0/pkgname/pkgname").exists());
    }

    #[test]
    fn test_install_flat_zip_gets_wrapped() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(
            temp.path(),
            &[("glm.hpp", Some("// glm")), ("detail/setup.hpp", Some("//"))],
        );

        install_archive(&archive, ArchiveFormat::Zip, &vendor, "glm", "glm-1.0.1").unwrap();

        assert!(vendor.join("glm-1.0.1/glm/glm.hpp").is_file());
        assert!(vendor.join("glm-1.0.1/glm/detail/setup.hpp").is_file());
    }

    #[test]
    fn test_install_bare_executable_zip() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(temp.path(), &[("premake5.exe", Some("MZ binary"))]);

        let artifact = install_archive(
            &archive,
            ArchiveFormat::Zip,
            &vendor,
            "premake5",
            "premake5-5.0.0-beta4",
        )
        .unwrap();

        assert_eq!(
            artifact,
            InstalledArtifact::Executable(vendor.join("premake5.exe"))
        );
        assert!(vendor.join("premake5.exe").is_file());
        assert!(!vendor.join("premake5-5.0.0-beta4").exists());
    }

    #[test]
    fn test_install_empty_zip_errors_and_keeps_vendor_clean() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = zip_with_entries(temp.path(), &[]);

        let err = install_archive(&archive, ArchiveFormat::Zip, &vendor, "foo", "foo-1.0")
            .unwrap_err();

        assert!(matches!(err, SetupError::Extraction(_)));
        assert!(!vendor.join("foo-1.0").exists());
        // Staging directory must have been dropped.
        assert_eq!(fs::read_dir(&vendor).unwrap().count(), 0);
    }

    #[test]
    fn test_install_malformed_zip_errors() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();
        let archive = temp.path().join("garbage.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let err = install_archive(&archive, ArchiveFormat::Zip, &vendor, "foo", "foo-1.0")
            .unwrap_err();

        assert!(matches!(err, SetupError::Extraction(_)));
        assert!(!vendor.join("foo-1.0").exists());
    }

    #[test]
    fn test_install_tar_gz_single_root() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();

        let archive = temp.path().join("test.tar.gz");
        let file = File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let content = b"obj loader";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "tinyobjloader-2.0/tiny_obj_loader.h", &content[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        install_archive(
            &archive,
            ArchiveFormat::TarGz,
            &vendor,
            "tinyobjloader",
            "tinyobjloader-2.0",
        )
        .unwrap();

        assert!(
            vendor
                .join("tinyobjloader-2.0/tinyobjloader/tiny_obj_loader.h")
                .is_file()
        );
    }

    #[test]
    fn test_extract_tar_rejects_link_outside_dest() {
        let temp = tempfile::tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir(&vendor).unwrap();

        let archive = temp.path().join("escape.tar.gz");
        let file = File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Link);
        header.set_size(0);
        header.set_mode(0o777);
        header.set_cksum();
        header.set_link_name("/etc/passwd").unwrap();
        builder
            .append_data(&mut header, "hl", std::io::empty())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = install_archive(&archive, ArchiveFormat::TarGz, &vendor, "foo", "foo-1.0")
            .unwrap_err();
        assert!(err.to_string().contains("unsafe link target"));
        assert!(!vendor.join("foo-1.0").exists());
    }
}
