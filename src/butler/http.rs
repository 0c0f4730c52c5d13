//! HTTP utilities for fetching the publishing tool.
//!
//! Provides the download itself, optional SHA-256 pinning and in-place ZIP
//! extraction.

use crate::error::{ErrorExt, Result, ToolError};
use futures_lite::StreamExt as _;
use std::path::{Component, Path};

/// Placeholder substituted with the platform tag in URL templates
pub const PLATFORM_PLACEHOLDER: &str = "{platform}";

/// Render a download URL template for `platform_tag` and check it parses.
pub fn download_url(template: &str, platform_tag: &str) -> Result<url::Url> {
    let rendered = template.replace(PLATFORM_PLACEHOLDER, platform_tag);
    url::Url::parse(&rendered).map_err(|source| {
        ToolError::InvalidUrl {
            url: rendered.clone(),
            source,
        }
        .into()
    })
}

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. A single GET, no retries.
pub async fn download(url: &url::Url) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = reqwest::get(url.clone()).await.map_err(ToolError::from)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ToolError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let mut data = Vec::new();
    let mut stream = std::pin::pin!(response.bytes_stream());
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk.map_err(ToolError::from)?);
    }
    log::debug!("Downloaded {} bytes from {}", data.len(), url);

    Ok(data)
}

/// Verifies that data matches the expected SHA-256 digest.
///
/// Compares the hash case-insensitively. Runs on the blocking pool since
/// hashing is CPU-bound.
pub async fn verify_sha256(data: &[u8], expected_hash: &str) -> Result<()> {
    use sha2::Digest as _;

    let data = data.to_vec();
    let expected_hash = expected_hash.to_string();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut hasher = sha2::Sha256::new();
        hasher.update(&data);
        let actual_hash = hex::encode(hasher.finalize());

        if actual_hash.eq_ignore_ascii_case(&expected_hash) {
            Ok(())
        } else {
            Err(ToolError::HashMismatch {
                expected: expected_hash,
                actual: actual_hash,
            }
            .into())
        }
    })
    .await
    .map_err(|e| std::io::Error::other(format!("hash verification task failed: {e}")))?
}

/// Whether an archive entry name could escape the extraction directory.
///
/// Rejects `..` components, rooted names and drive prefixes (`C:x`) in both
/// separator styles, whatever the host platform.
fn is_unsafe_entry(name: &str) -> bool {
    let drive_prefix = matches!(name.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic());
    drive_prefix
        || name.starts_with(['/', '\\'])
        || name.split(['/', '\\']).any(|part| part == "..")
        || Path::new(name).components().any(|c| {
            matches!(
                c,
                Component::Prefix(_) | Component::RootDir | Component::ParentDir
            )
        })
}

/// Extracts a ZIP archive from memory into a destination directory.
///
/// Entries that could land outside `dest` are rejected before anything is
/// written for them.
pub async fn extract_zip(data: &[u8], dest: &Path) -> Result<Vec<std::path::PathBuf>> {
    use async_zip::base::read::mem::ZipFileReader;
    use futures_lite::io::AsyncReadExt as _;

    let zip_err = |e: async_zip::error::ZipError| ToolError::Zip {
        reason: e.to_string(),
    };

    let reader = ZipFileReader::new(data.to_vec()).await.map_err(zip_err)?;
    let mut written = Vec::new();

    for i in 0..reader.file().entries().len() {
        let entry = reader.file().entries().get(i).ok_or_else(|| ToolError::Zip {
            reason: format!("missing entry {i}"),
        })?;

        let filename = entry.filename().as_str().map_err(zip_err)?.to_string();

        if is_unsafe_entry(&filename) {
            return Err(ToolError::UnsafeEntry { name: filename }.into());
        }

        if entry.dir().map_err(zip_err)? {
            let dir_path = dest.join(&filename);
            tokio::fs::create_dir_all(&dir_path)
                .await
                .fs_context("creating directory", &dir_path)?;
            continue;
        }

        let file_path = dest.join(&filename);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating directory", parent)?;
        }

        let mut entry_reader = reader.reader_with_entry(i).await.map_err(zip_err)?;
        let mut content = Vec::new();
        entry_reader
            .read_to_end(&mut content)
            .await
            .fs_context("reading archive entry", &file_path)?;

        tokio::fs::write(&file_path, content)
            .await
            .fs_context("writing file", &file_path)?;
        log::debug!("Extracted {}", file_path.display());
        written.push(file_path);
    }

    Ok(written)
}

/// Mark a file as executable (0o755). No-op on non-unix hosts.
#[cfg(unix)]
pub async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .fs_context("setting permissions on", path)
}

/// Mark a file as executable (0o755). No-op on non-unix hosts.
#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
