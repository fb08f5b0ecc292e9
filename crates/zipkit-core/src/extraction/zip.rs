//! ZIP archive extraction.
//!
//! Every entry name is checked by [`PathGuard`] before anything is written
//! for it, and the first escaping entry aborts the whole extraction. File
//! contents are streamed into a [`StagedFile`] beside the target so a failed
//! or wrongly keyed entry never leaves partial plaintext on disk.

use crate::ArchiveError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::config::ExtractionConfig;
use crate::io::StagedFile;
use crate::security::PathGuard;
use crate::types::DestDir;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use zip::ZipArchive;
use zip::result::ZipError;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Metadata of one entry, read from the central directory.
#[derive(Debug)]
struct EntryInfo {
    name: String,
    is_dir: bool,
    encrypted: bool,
    unix_mode: Option<u32>,
}

impl EntryInfo {
    fn is_symlink(&self) -> bool {
        self.unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK)
    }
}

/// Extracts the ZIP archive at `source` into `dest`.
///
/// Entries are processed in central-directory order. Existing files are
/// overwritten. Symlink entries are skipped with a warning.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use zipkit_core::NoopProgress;
/// use zipkit_core::extraction::ExtractionConfig;
/// use zipkit_core::extraction::read_archive;
/// use zipkit_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/output")?;
/// let report = read_archive(
///     Path::new("archive.zip"),
///     &dest,
///     &ExtractionConfig::default(),
///     &mut NoopProgress,
/// )?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// - `SourceNotFound` if the archive does not exist
/// - `CorruptArchive` if the container is malformed or a plain entry fails
///   its CRC check
/// - `ZipSlipDetected` if an entry resolves outside `dest`
/// - `WrongPassword` if an encrypted entry has no password or the password
///   does not match
/// - `DecryptionFailed` if encrypted data fails authentication
/// - `ReadFailed` / `WriteFailed` on I/O errors
pub fn read_archive(
    source: &Path,
    dest: &DestDir,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    config.validate()?;
    let start = Instant::now();

    let file = File::open(source).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            ArchiveError::SourceNotFound {
                path: source.to_path_buf(),
            }
        } else {
            ArchiveError::ReadFailed {
                path: source.to_path_buf(),
                source: err,
            }
        }
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ArchiveError::from_zip_read(e, source))?;

    let guard = PathGuard::new(dest.clone());
    let mut report = ExtractionReport::new();
    let mut buffer = vec![0u8; config.buffer_size];
    let total_entries = archive.len();

    for index in 0..total_entries {
        let info = entry_info(&mut archive, index, source)?;
        let entry_path = Path::new(&info.name);
        progress.on_entry_start(entry_path, total_entries, index + 1);

        let target = guard.guard(&info.name)?;

        // A file entry that resolves to the root itself (`a/..`) would be
        // staged in the root's parent.
        if !info.is_dir && target == guard.root() {
            log::warn!("rejecting file entry at the destination root: {:?}", info.name);
            return Err(ArchiveError::ZipSlipDetected {
                entry: info.name.clone(),
            });
        }

        if info.is_symlink() {
            log::warn!("skipping symlink entry {:?}", info.name);
            report.entries_skipped += 1;
            report.add_warning(format!("Skipped symlink: {}", info.name));
        } else if info.is_dir {
            fs::create_dir_all(&target).map_err(|e| write_failed(&target, e))?;
            report.directories_created += 1;
        } else {
            let written = extract_file(
                &mut archive,
                index,
                &info,
                &target,
                source,
                config,
                &mut buffer,
                progress,
            )?;
            report.files_extracted += 1;
            report.bytes_written += written;
            if info.encrypted {
                report.entries_decrypted += 1;
            }
        }

        log::debug!("extracted {:?}", info.name);
        progress.on_entry_complete(entry_path);
    }

    report.duration = start.elapsed();
    progress.on_complete();

    log::info!(
        "extracted {} into {} ({} files, {} directories)",
        source.display(),
        dest.as_path().display(),
        report.files_extracted,
        report.directories_created
    );

    Ok(report)
}

fn entry_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    source: &Path,
) -> Result<EntryInfo> {
    let file = archive
        .by_index_raw(index)
        .map_err(|e| ArchiveError::from_zip_read(e, source))?;

    Ok(EntryInfo {
        name: file.name().to_string(),
        is_dir: file.is_dir(),
        encrypted: file.encrypted(),
        unix_mode: file.unix_mode(),
    })
}

#[allow(clippy::too_many_arguments)]
fn extract_file<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    info: &EntryInfo,
    target: &Path,
    source: &Path,
    config: &ExtractionConfig,
    buffer: &mut [u8],
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }

    let mut staged = StagedFile::new(target).map_err(|e| write_failed(target, e))?;

    let written = if info.encrypted {
        let password = config
            .encryption
            .password()
            .ok_or_else(|| ArchiveError::WrongPassword {
                entry: info.name.clone(),
            })?;
        let mut reader = archive
            .by_index_decrypt(index, password.as_bytes())
            .map_err(|e| open_failed(e, info, source))?;
        copy_entry(&mut reader, &mut staged, info, source, buffer, progress)?
    } else {
        let mut reader = archive
            .by_index(index)
            .map_err(|e| open_failed(e, info, source))?;
        copy_entry(&mut reader, &mut staged, info, source, buffer, progress)?
    };

    if config.preserve_permissions {
        restore_permissions(staged.temp_path(), info.unix_mode)?;
    }

    staged.commit().map_err(|e| write_failed(target, e))?;
    Ok(written)
}

/// Streams entry data into `out`.
fn copy_entry(
    reader: &mut impl Read,
    out: &mut StagedFile,
    info: &EntryInfo,
    source: &Path,
    buffer: &mut [u8],
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let mut bytes_written = 0u64;
    loop {
        let bytes_read = reader
            .read(buffer)
            .map_err(|e| stream_failed(e, info, source))?;
        if bytes_read == 0 {
            break;
        }
        out.write_all(&buffer[..bytes_read])
            .map_err(|e| write_failed(out.target(), e))?;
        bytes_written += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }
    Ok(bytes_written)
}

#[cfg(unix)]
fn restore_permissions(path: &Path, mode: Option<u32>) -> Result<()> {
    use crate::security::sanitize_permissions;
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(sanitize_permissions(mode)))
            .map_err(|e| write_failed(path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restore_permissions(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

fn write_failed(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::WriteFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Maps an error from opening an entry for reading.
fn open_failed(err: ZipError, info: &EntryInfo, source: &Path) -> ArchiveError {
    match err {
        ZipError::InvalidPassword => ArchiveError::WrongPassword {
            entry: info.name.clone(),
        },
        other => ArchiveError::from_zip_read(other, source),
    }
}

/// Maps an I/O error raised while decompressing (and decrypting) an entry.
fn stream_failed(err: io::Error, info: &EntryInfo, source: &Path) -> ArchiveError {
    if info.encrypted {
        return ArchiveError::DecryptionFailed {
            entry: info.name.clone(),
            source: err,
        };
    }

    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            ArchiveError::corrupt(format!("entry {}: {err}", info.name))
        }
        _ => ArchiveError::ReadFailed {
            path: source.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::NoopProgress;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::create_test_zip;
    use crate::types::Encryption;
    use tempfile::TempDir;

    fn write_archive(temp: &TempDir, data: &[u8]) -> std::path::PathBuf {
        let path = temp.path().join("input.zip");
        fs::write(&path, data).unwrap();
        path
    }

    fn extract(archive: &Path, out: &Path, config: &ExtractionConfig) -> Result<ExtractionReport> {
        let dest = DestDir::create(out).unwrap();
        read_archive(archive, &dest, config, &mut NoopProgress)
    }

    #[test]
    fn test_extract_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_directory("root/")
            .add_file("root/a.txt", b"alpha")
            .add_file("root/sub/b.txt", b"beta")
            .build();
        let archive = write_archive(&temp, &data);
        let out = temp.path().join("out");

        let report = extract(&archive, &out, &ExtractionConfig::default()).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.directories_created, 1);
        assert_eq!(report.bytes_written, 9);
        assert_eq!(fs::read_to_string(out.join("root/a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(out.join("root/sub/b.txt")).unwrap(), "beta");
    }

    #[test]
    fn test_extract_overwrites_existing_files() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, &create_test_zip(vec![("f.txt", b"new")]));
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("f.txt"), "old contents").unwrap();

        extract(&archive, &out, &ExtractionConfig::default()).unwrap();
        extract(&archive, &out, &ExtractionConfig::default()).unwrap();

        assert_eq!(fs::read_to_string(out.join("f.txt")).unwrap(), "new");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_zip_slip_aborts_extraction() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            &create_test_zip(vec![
                ("ok.txt", b"fine"),
                ("../../evil.txt", b"evil"),
                ("after.txt", b"never"),
            ]),
        );
        let out = temp.path().join("nested/out");

        let err = extract(&archive, &out, &ExtractionConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            ArchiveError::ZipSlipDetected { ref entry } if entry == "../../evil.txt"
        ));
        assert!(!temp.path().join("evil.txt").exists());
        assert!(!temp.path().join("nested/evil.txt").exists());
        assert!(!out.join("after.txt").exists());
    }

    #[test]
    fn test_file_entry_resolving_to_root_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, &create_test_zip(vec![("a/..", b"x")]));
        let out = temp.path().join("out");

        let err = extract(&archive, &out, &ExtractionConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            ArchiveError::ZipSlipDetected { ref entry } if entry == "a/.."
        ));
        let siblings: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(siblings.len(), 2, "unexpected files beside dest: {siblings:?}");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_absolute_entry_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, &create_test_zip(vec![("/tmp/abs.txt", b"x")]));
        let out = temp.path().join("out");

        let err = extract(&archive, &out, &ExtractionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZipSlipDetected);
    }

    #[test]
    fn test_encrypted_entries_roundtrip() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .with_password("s3cret")
            .add_file("secret.txt", b"top secret")
            .build();
        let archive = write_archive(&temp, &data);
        let out = temp.path().join("out");

        let config =
            ExtractionConfig::default().with_encryption(Encryption::from_password(Some("s3cret")));
        let report = extract(&archive, &out, &config).unwrap();

        assert_eq!(report.entries_decrypted, 1);
        assert_eq!(
            fs::read_to_string(out.join("secret.txt")).unwrap(),
            "top secret"
        );
    }

    #[test]
    fn test_encrypted_entry_without_password() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .with_password("s3cret")
            .add_file("secret.txt", b"top secret")
            .build();
        let archive = write_archive(&temp, &data);
        let out = temp.path().join("out");

        let err = extract(&archive, &out, &ExtractionConfig::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::WrongPassword);
        assert!(!out.join("secret.txt").exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_encrypted_entry_wrong_password() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .with_password("s3cret")
            .add_file("secret.txt", &[7u8; 4096])
            .build();
        let archive = write_archive(&temp, &data);
        let out = temp.path().join("out");

        let config =
            ExtractionConfig::default().with_encryption(Encryption::from_password(Some("nope")));
        let err = extract(&archive, &out, &config).unwrap_err();

        assert!(err.is_password_error());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_plain_entries_ignore_password() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, &create_test_zip(vec![("plain.txt", b"hi")]));
        let out = temp.path().join("out");

        let config =
            ExtractionConfig::default().with_encryption(Encryption::from_password(Some("pw")));
        let report = extract(&archive, &out, &config).unwrap();

        assert_eq!(report.entries_decrypted, 0);
        assert_eq!(fs::read_to_string(out.join("plain.txt")).unwrap(), "hi");
    }

    #[test]
    fn test_symlink_entries_skipped() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_symlink("link", "/etc/passwd")
            .add_file("real.txt", b"data")
            .build();
        let archive = write_archive(&temp, &data);
        let out = temp.path().join("out");

        let report = extract(&archive, &out, &ExtractionConfig::default()).unwrap();

        assert_eq!(report.entries_skipped, 1);
        assert!(report.has_warnings());
        assert!(fs::symlink_metadata(out.join("link")).is_err());
        assert!(out.join("real.txt").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, b"this is not a zip file at all");
        let out = temp.path().join("out");

        let err = extract(&archive, &out, &ExtractionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptArchive);
    }

    #[test]
    fn test_missing_archive() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");

        let err = extract(
            &temp.path().join("missing.zip"),
            &out,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_preserve_permissions_sanitized() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file_with_mode("tool.sh", b"#!/bin/sh\n", 0o4755)
            .build();
        let archive = write_archive(&temp, &data);

        let kept = temp.path().join("kept");
        extract(
            &archive,
            &kept,
            &ExtractionConfig::default().with_preserve_permissions(true),
        )
        .unwrap();
        let mode = fs::metadata(kept.join("tool.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o755);
    }
}
