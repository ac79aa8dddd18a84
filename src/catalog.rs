//! Dependency descriptors and the fixed third-party catalog.
//!
//! The catalog is built once at process start and passed into the acquirer
//! as an immutable list. Each entry names a package, the version the engine
//! builds against, and the exact upstream URL to fetch it from.

/// Archive container formats the acquirer can unpack natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// File extension used for the temporary download at the vendor root.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

/// What kind of artifact a source URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// An archive that gets extracted and layout-normalized.
    Archive(ArchiveFormat),
    /// A bare single-file executable installed as `{name}.exe`.
    Executable,
}

/// Detect the artifact kind from a URL's trailing extension.
fn detect_artifact(url: &str) -> Option<ArtifactKind> {
    let url = url.to_lowercase();
    if url.ends_with(".zip") {
        Some(ArtifactKind::Archive(ArchiveFormat::Zip))
    } else if url.ends_with(".tar.gz") || url.ends_with(".tgz") {
        Some(ArtifactKind::Archive(ArchiveFormat::TarGz))
    } else if url.ends_with(".exe") {
        Some(ArtifactKind::Executable)
    } else {
        None
    }
}

/// One third-party dependency: name, version, and where to fetch it.
///
/// Identity is the name. Everything else the acquirer needs (install
/// directory, executable name, download filename) is derived from here.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub source_url: String,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_url: source_url.into(),
        }
    }

    /// Canonical install directory name at the vendor root: `{name}-{version}`.
    pub fn install_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Name of the bare-executable form of this package: `{name}.exe`.
    pub fn exe_name(&self) -> String {
        format!("{}.exe", self.name)
    }

    /// Filename the archive is downloaded to before extraction.
    pub fn archive_file_name(&self, format: ArchiveFormat) -> String {
        format!("{}.{}", self.install_dir_name(), format.extension())
    }

    /// Artifact kind sniffed from the source URL extension.
    pub fn artifact(&self) -> Option<ArtifactKind> {
        detect_artifact(&self.source_url)
    }
}

/// The fixed set of third-party packages the engine builds against.
pub fn default_catalog() -> Vec<Dependency> {
    const PREMAKE_VERSION: &str = "5.0.0-beta4";
    const GLFW_VERSION: &str = "3.4";
    const GLM_VERSION: &str = "1.0.1";
    // ImGui tracks the docking branch; upstream does not tag docking releases.
    const IMGUI_VERSION: &str = "docking";
    const TINYOBJLOADER_VERSION: &str = "2.0";
    // stb does not do releases.
    const STBI_VERSION: &str = "master";

    vec![
        Dependency::new(
            "premake5",
            PREMAKE_VERSION,
            format!(
                "https://github.com/premake/premake-core/releases/download/v{PREMAKE_VERSION}/premake-{PREMAKE_VERSION}-windows.zip"
            ),
        ),
        Dependency::new(
            "glfw",
            GLFW_VERSION,
            format!(
                "https://github.com/glfw/glfw/releases/download/{GLFW_VERSION}/glfw-{GLFW_VERSION}.bin.WIN64.zip"
            ),
        ),
        Dependency::new(
            "glm",
            GLM_VERSION,
            format!(
                "https://github.com/g-truc/glm/releases/download/{GLM_VERSION}/glm-{GLM_VERSION}-light.zip"
            ),
        ),
        Dependency::new(
            "imgui",
            IMGUI_VERSION,
            "https://github.com/ocornut/imgui/archive/refs/heads/docking.zip",
        ),
        Dependency::new(
            "tinyobjloader",
            TINYOBJLOADER_VERSION,
            format!(
                "https://github.com/tinyobjloader/tinyobjloader/archive/refs/tags/v{TINYOBJLOADER_VERSION}-rc1.zip"
            ),
        ),
        Dependency::new(
            "stbi",
            STBI_VERSION,
            "https://github.com/nothings/stb/archive/refs/heads/master.zip",
        ),
    ]
}
