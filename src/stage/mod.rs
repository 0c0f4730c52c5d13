//! Staging directory assembly.
//!
//! A staging directory is created fresh for every release, filled from a
//! [`StageManifest`], and handed as a whole to the publishing tool. Creating
//! it over an existing directory fails unless `clean` is requested.

pub mod fs;

use crate::build::artifact_path;
use crate::channel::OsName;
use crate::error::{ErrorExt, Result, StageError};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Whether a manifest entry is a directory tree or a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Copied recursively
    Dir,
    /// Copied as a single regular file
    File,
}

/// One top-level item of a staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    /// Directory or file
    pub kind: EntryKind,
    /// Where to copy from
    pub source: PathBuf,
    /// Name inside the staging directory
    pub name: String,
}

impl StageEntry {
    /// Directory entry staged under `name`
    pub fn dir(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Dir,
            source: source.into(),
            name: name.into(),
        }
    }

    /// File entry staged under `name`
    pub fn file(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Exact top-level layout a channel expects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageManifest {
    entries: Vec<StageEntry>,
}

impl StageManifest {
    /// Empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn with(mut self, entry: StageEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// `assets/` plus the release binary for `os`, named `<binary><suffix>`.
    pub fn native(project_dir: &Path, target_dir: &Path, binary: &str, os: &OsName) -> Self {
        let suffix = os.binary_suffix();
        Self::new()
            .with(StageEntry::dir(project_dir.join("assets"), "assets"))
            .with(StageEntry::file(
                artifact_path(target_dir, binary, suffix),
                format!("{binary}{suffix}"),
            ))
    }

    /// `assets/`, the compiled `pkg/` directory and `index.html`.
    pub fn web(project_dir: &Path) -> Self {
        Self::new()
            .with(StageEntry::dir(project_dir.join("assets"), "assets"))
            .with(StageEntry::dir(project_dir.join("pkg"), "pkg"))
            .with(StageEntry::file(project_dir.join("index.html"), "index.html"))
    }

    /// Entries in copy order
    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    /// Sorted top-level names
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Absolute form of `path` with symlinks resolved as far as the path exists.
fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = normalize(&std::path::absolute(path)?);
    let mut base = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(base) {
            return Ok(rest.iter().rev().fold(canonical, |acc, name| acc.join(name)));
        }
        match (base.parent(), base.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                base = parent;
            }
            _ => return Ok(base.to_path_buf()),
        }
    }
}

/// Drop `.` components and fold `..` into their parent
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Fail if removing `staging` would also remove `project_dir`.
pub fn check_clean_target(staging: &Path, project_dir: &Path) -> Result<()> {
    let staging_abs = resolve(staging).fs_context("resolving", staging)?;
    let project_abs = resolve(project_dir).fs_context("resolving", project_dir)?;
    if project_abs.starts_with(&staging_abs) {
        return Err(StageError::UnsafeCleanTarget {
            path: staging_abs,
            project_dir: project_abs,
        }
        .into());
    }
    Ok(())
}

/// Fail if `tool_dir` is `staging` or lies below it.
pub fn check_tool_dir(staging: &Path, tool_dir: &Path) -> Result<()> {
    let staging_abs = resolve(staging).fs_context("resolving", staging)?;
    let tool_abs = resolve(tool_dir).fs_context("resolving", tool_dir)?;
    if tool_abs.starts_with(&staging_abs) {
        return Err(StageError::ToolDirInStaging {
            tool_dir: tool_abs,
            path: staging_abs,
        }
        .into());
    }
    Ok(())
}

/// A freshly created staging directory
#[derive(Debug, Clone)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Create the staging directory.
    ///
    /// Fails with [`StageError::AlreadyExists`] when `path` exists, unless
    /// `clean` is set, in which case the old directory is removed first.
    /// Cleaning never removes the working directory or one of its ancestors.
    pub async fn create(path: impl Into<PathBuf>, clean: bool) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            if !clean {
                return Err(StageError::AlreadyExists { path }.into());
            }
            check_clean_target(&path, Path::new("."))?;
            log::info!("Removing existing staging directory {}", path.display());
            fs::remove_dir_all(&path).await?;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating directory", parent)?;
        }
        tokio::fs::create_dir(&path)
            .await
            .fs_context("creating staging directory", &path)?;
        log::debug!("Created staging directory {}", path.display());
        Ok(Self { path })
    }

    /// Staging directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy every manifest entry into the staging directory.
    ///
    /// Stops at the first missing source; whatever was already copied stays.
    pub async fn stage(&self, manifest: &StageManifest) -> Result<Vec<PathBuf>> {
        let mut staged = Vec::with_capacity(manifest.entries().len());
        for entry in manifest.entries() {
            let dest = self.path.join(&entry.name);
            log::info!("Staging {} -> {}", entry.source.display(), dest.display());
            match entry.kind {
                EntryKind::Dir => fs::copy_dir(&entry.source, &dest).await?,
                EntryKind::File => fs::copy_file(&entry.source, &dest).await?,
            }
            staged.push(dest);
        }
        Ok(staged)
    }

    /// Check that the directory holds exactly the manifest's entries.
    pub async fn verify(&self, manifest: &StageManifest) -> Result<()> {
        let mut found = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.path)
            .await
            .fs_context("reading staging directory", &self.path)?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .fs_context("reading staging directory", &self.path)?
        {
            found.push(entry.file_name().to_string_lossy().into_owned());
        }
        found.sort();

        if found.is_empty() {
            return Err(StageError::Empty {
                path: self.path.clone(),
            }
            .into());
        }

        let expected = manifest.names();
        if found != expected {
            return Err(StageError::UnexpectedLayout {
                path: self.path.clone(),
                expected,
                found,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_manifest_for_windows() {
        let os = OsName::new("windows").unwrap();
        let manifest = StageManifest::native(Path::new("game"), Path::new("game/target"), "dynamaze", &os);
        assert_eq!(manifest.names(), ["assets", "dynamaze.exe"]);
        assert_eq!(
            manifest.entries()[1].source,
            Path::new("game/target/release/dynamaze.exe")
        );
    }

    #[test]
    fn test_web_manifest_names() {
        let manifest = StageManifest::web(Path::new("."));
        assert_eq!(manifest.names(), ["assets", "index.html", "pkg"]);
        assert_eq!(manifest.entries()[2].kind, EntryKind::File);
    }

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/game/./dist/../pkg")), Path::new("/game/pkg"));
    }

    #[test]
    fn test_clean_target_must_not_contain_project() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("game");
        std::fs::create_dir(&project).unwrap();

        check_clean_target(&project.join("dist"), &project).unwrap();
        for staging in [project.join("."), project.join(".."), tmp.path().to_path_buf()] {
            let err = check_clean_target(&staging, &project).unwrap_err();
            assert!(matches!(
                err,
                crate::error::ReleaseError::Stage(StageError::UnsafeCleanTarget { .. })
            ));
        }
    }

    #[test]
    fn test_tool_dir_must_stay_outside_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();

        check_tool_dir(&root.join("dist"), root).unwrap();
        check_tool_dir(&root.join("dist"), &root.join("distant")).unwrap();
        for tool_dir in [root.join("dist"), root.join("dist/./bin")] {
            let err = check_tool_dir(&root.join("dist"), &tool_dir).unwrap_err();
            assert!(matches!(
                err,
                crate::error::ReleaseError::Stage(StageError::ToolDirInStaging { .. })
            ));
        }
        let err = check_tool_dir(root, root).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Stage(StageError::ToolDirInStaging { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_nested_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = StagingDir::create(tmp.path().join("out/dist"), false).await.unwrap();
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn test_verify_rejects_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = StagingDir::create(tmp.path().join("dist"), false).await.unwrap();
        let err = dir.verify(&StageManifest::web(tmp.path())).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Stage(StageError::Empty { .. })
        ));
    }
}
