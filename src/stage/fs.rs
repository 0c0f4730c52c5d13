//! File system helpers for staging.
//!
//! Copies preserve directory structure; symlinks inside copied trees are
//! recreated rather than followed.

use crate::error::{ErrorExt, Result, StageError};
use std::{io, path::Path};
use tokio::fs;

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)?;
    }
    Ok(())
}

/// Copies a regular file, creating the destination's parent directories.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(StageError::MissingSource {
            path: from.to_path_buf(),
        }
        .into());
    }
    if !from.is_file() {
        return Err(StageError::NotAFile {
            path: from.to_path_buf(),
        }
        .into());
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory, creating the destination's parents.
///
/// Fails if the source path is not a directory or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(StageError::MissingSource {
            path: from.to_path_buf(),
        }
        .into());
    }
    if !from.is_dir() {
        return Err(StageError::NotADirectory {
            path: from.to_path_buf(),
        }
        .into());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(StageError::from)?;
        let rel_path = entry.path().strip_prefix(from).map_err(StageError::from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .fs_context("reading symlink", entry.path())?;
            if entry.path().is_dir() {
                symlink_dir(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            } else {
                symlink_file(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            }
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .fs_context("copying file", entry.path())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    #[tokio::test]
    async fn test_copy_dir_preserves_structure() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("assets");
        std::fs::create_dir_all(src.join("sounds")).unwrap();
        std::fs::write(src.join("FiraSans-Regular.ttf"), b"font").unwrap();
        std::fs::write(src.join("sounds/BlueEther.mp3"), b"music").unwrap();

        let dest = tmp.path().join("dist/assets");
        copy_dir(&src, &dest).await.unwrap();

        assert_eq!(std::fs::read(dest.join("FiraSans-Regular.ttf")).unwrap(), b"font");
        assert_eq!(std::fs::read(dest.join("sounds/BlueEther.mp3")).unwrap(), b"music");
    }

    #[tokio::test]
    async fn test_copy_dir_rejects_file_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("index.html");
        std::fs::write(&src, b"<html>").unwrap();

        let err = copy_dir(&src, &tmp.path().join("out")).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Stage(StageError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_copy_file_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(&tmp.path().join("nope"), &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Stage(StageError::MissingSource { .. })));
    }

    #[tokio::test]
    async fn test_copy_file_rejects_directory_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(tmp.path(), &tmp.path().join("out")).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Stage(StageError::NotAFile { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_dir_recreates_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("pkg");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("dynamaze_bg.wasm"), b"wasm").unwrap();
        std::os::unix::fs::symlink("dynamaze_bg.wasm", src.join("latest.wasm")).unwrap();

        let dest = tmp.path().join("dist/pkg");
        copy_dir(&src, &dest).await.unwrap();

        let link = std::fs::read_link(dest.join("latest.wasm")).unwrap();
        assert_eq!(link, Path::new("dynamaze_bg.wasm"));
    }

    #[tokio::test]
    async fn test_remove_missing_dir_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        remove_dir_all(&tmp.path().join("dist")).await.unwrap();
    }
}
