//! Archive extraction for release assets.
//!
//! Release archives are `.tar.gz` on Darwin and Linux and `.zip` on Windows.
//! Both formats are unpacked into the bin directory with their relative
//! paths preserved.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::fmt;
use std::path::{Component, Path};
use tar::Archive;

use super::platform::PlatformInfo;
use crate::errors::InstallError;

/// Container format of a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar.
    TarGz,
    /// Deflate zip.
    Zip,
}

impl ArchiveFormat {
    /// File extension including the leading dot.
    #[must_use = "returns the extension string without side effects"]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::Zip => ".zip",
        }
    }

    /// Extracts every entry of `archive_path` into `dest_dir`.
    ///
    /// Creates `dest_dir` if it does not exist. The archive itself is left in
    /// place; see [`extract_archive`] for the consuming variant.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Extraction`] if the archive cannot be read, is
    /// malformed, contains an absolute or `..` path, or an entry cannot be
    /// written.
    pub fn extract(self, archive_path: &Path, dest_dir: &Path) -> Result<()> {
        let result = match self {
            Self::TarGz => extract_tar_gz(archive_path, dest_dir),
            Self::Zip => extract_zip(archive_path, dest_dir),
        };

        result.map_err(|e| InstallError::extraction(archive_path, format!("{e:#}")).into())
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Extracts an archive and deletes it afterwards, whatever the outcome.
///
/// # Errors
///
/// Returns the extraction error, if any. Failure to delete the archive is
/// logged and not reported.
pub fn extract_archive(archive_path: &Path, format: ArchiveFormat, dest_dir: &Path) -> Result<()> {
    let result = format.extract(archive_path, dest_dir);

    match std::fs::remove_file(archive_path) {
        Ok(()) => println!("Cleaned up {}.", archive_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %archive_path.display(),
            error = %e,
            "failed to remove archive after extraction"
        ),
    }

    result
}

/// Rejects entry paths that would escape the destination directory.
fn check_entry_path(entry_path: &Path) -> Result<()> {
    if entry_path.is_absolute()
        || entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        bail!(
            "Refusing to extract path with parent directory or absolute reference: {}",
            entry_path.display()
        );
    }
    Ok(())
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let entry_path = entry
            .enclosed_name()
            .with_context(|| format!("Invalid entry path in archive: {}", entry.name()))?;
        check_entry_path(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut outfile = std::fs::File::create(&output_path)
            .with_context(|| format!("Failed to create file: {}", output_path.display()))?;

        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract: {}", output_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let perms = std::fs::Permissions::from_mode(mode & 0o7777);
                std::fs::set_permissions(&output_path, perms).with_context(|| {
                    format!("Failed to set permissions: {}", output_path.display())
                })?;
            }
        }
    }

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive
        .entries()
        .with_context(|| format!("Failed to read tar entries: {}", archive_path.display()))?
    {
        let mut entry = entry
            .with_context(|| format!("Failed to read tar entry: {}", archive_path.display()))?;

        let entry_path = entry
            .path()
            .context("Failed to get entry path")?
            .into_owned();
        check_entry_path(&entry_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            bail!("Refusing to extract link entry: {}", entry_path.display());
        }

        let unpacked = entry.unpack_in(dest_dir).with_context(|| {
            format!("Failed to extract: {}", dest_dir.join(&entry_path).display())
        })?;
        if !unpacked {
            bail!(
                "Refusing to extract path outside {}: {}",
                dest_dir.display(),
                entry_path.display()
            );
        }
    }

    Ok(())
}

/// Makes the installed binary executable for its owner.
///
/// Adds the owner-execute bit and keeps every other mode bit. Skipped for
/// Windows targets. Returns whether the permissions were changed.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or the permissions
/// cannot be written.
pub fn ensure_executable(binary_path: &Path, platform: &PlatformInfo) -> Result<bool> {
    if platform.is_windows() {
        tracing::debug!("skipping permission change for Windows target");
        return Ok(false);
    }

    add_owner_execute(binary_path)?;
    println!("Set executable permission for {}", binary_path.display());
    Ok(true)
}

#[cfg(unix)]
fn add_owner_execute(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o100);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions: {}", path.display()))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn add_owner_execute(_path: &Path) -> Result<()> {
    Ok(())
}
