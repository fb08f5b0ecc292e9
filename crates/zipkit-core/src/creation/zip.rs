//! ZIP archive creation.
//!
//! Entries are streamed into a [`StagedFile`] next to the destination, so the
//! destination only ever holds a complete archive.

use crate::ArchiveError;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::creation::report::CreationReport;
use crate::creation::walker::collect_entries;
use crate::io::StagedFile;
use crate::types::ArchiveEntry;
use crate::types::EntryKind;
use crate::types::Encryption;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use zip::AesMode;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::FileOptions;
use zip::write::SimpleFileOptions;

/// Walks `source` and writes it to a ZIP archive at `destination`.
///
/// The parent directory of `destination` must exist.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use zipkit_core::NoopProgress;
/// use zipkit_core::creation::CreationConfig;
/// use zipkit_core::creation::create_zip;
///
/// let config = CreationConfig::default();
/// let report = create_zip(
///     Path::new("src"),
///     Path::new("output.zip"),
///     &config,
///     &mut NoopProgress,
/// )?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), zipkit_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - Source path does not exist
/// - The staging file next to `destination` cannot be created
/// - A source file cannot be read
/// - Writing the archive fails
pub fn create_zip(
    source: &Path,
    destination: &Path,
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    config.validate()?;

    let collected = collect_entries(source, config)?;
    let mut report = write_archive(&collected.entries, destination, config, progress)?;

    report.files_skipped += collected.warnings.len();
    for warning in collected.warnings {
        report.add_warning(warning);
    }

    Ok(report)
}

/// Writes `entries` to a ZIP archive at `destination`.
///
/// File entries are streamed through a buffer of `config.buffer_size` bytes.
/// With `Encryption::Aes`, every file entry is encrypted with WinZip AES-256;
/// directory entries carry no data and are stored unencrypted.
///
/// # Errors
///
/// Returns `DestinationUnwritable` if the staging file cannot be created,
/// `ReadFailed` if a source file cannot be read and `WriteFailed` if the
/// archive cannot be written. On error `destination` is left untouched.
pub fn write_archive(
    entries: &[ArchiveEntry],
    destination: &Path,
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let start = Instant::now();

    let staged =
        StagedFile::new(destination).map_err(|source| ArchiveError::DestinationUnwritable {
            path: destination.to_path_buf(),
            source,
        })?;

    let mut zip = ZipWriter::new(staged);
    let mut report = CreationReport::new();
    report.encrypted = config.encryption.is_encrypted();

    let options = base_options(config.compression_level);
    let mut buffer = vec![0u8; config.buffer_size];
    let total_entries = entries.len();

    for (idx, entry) in entries.iter().enumerate() {
        let entry_path = Path::new(&entry.name);
        progress.on_entry_start(entry_path, total_entries, idx + 1);

        match entry.kind {
            EntryKind::Directory => {
                if config.include_directory_entries {
                    zip.add_directory(entry.zip_name(), options)
                        .map_err(|e| ArchiveError::from_zip_write(e, destination))?;
                    report.directories_added += 1;
                }
            }
            EntryKind::File => {
                let written = add_file(
                    &mut zip,
                    entry,
                    destination,
                    config,
                    options,
                    &mut buffer,
                    progress,
                )?;
                report.files_added += 1;
                report.bytes_written += written;
            }
        }

        log::debug!("added {}", entry.zip_name());
        progress.on_entry_complete(entry_path);
    }

    let mut staged = zip
        .finish()
        .map_err(|e| ArchiveError::from_zip_write(e, destination))?;

    let write_failed = |source| ArchiveError::WriteFailed {
        path: destination.to_path_buf(),
        source,
    };
    report.bytes_compressed = staged.stream_position().map_err(write_failed)?;
    staged.commit().map_err(write_failed)?;

    report.duration = start.elapsed();
    progress.on_complete();

    log::info!(
        "created {} ({} files, {} directories, {} bytes)",
        destination.display(),
        report.files_added,
        report.directories_added,
        report.bytes_compressed
    );

    Ok(report)
}

/// Options shared by every entry: compression only.
fn base_options(level: Option<u8>) -> SimpleFileOptions {
    if level == Some(0) {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(level.map(i64::from))
    }
}

/// Per-file options: permissions, then encryption.
fn file_options<'k>(
    options: SimpleFileOptions,
    encryption: &'k Encryption,
    mode: Option<u32>,
) -> FileOptions<'k, ()> {
    let options = match mode {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    };

    match encryption {
        Encryption::None => options,
        Encryption::Aes(password) => {
            options.with_aes_encryption(AesMode::Aes256, password.expose())
        }
    }
}

#[cfg(unix)]
fn permissions_of(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn permissions_of(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}

/// Streams one source file into the archive and returns its size.
fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &ArchiveEntry,
    destination: &Path,
    config: &CreationConfig,
    options: SimpleFileOptions,
    buffer: &mut [u8],
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let read_failed = |source| ArchiveError::ReadFailed {
        path: entry.path.clone(),
        source,
    };

    let mut file = File::open(&entry.path).map_err(read_failed)?;
    let mode = if config.preserve_permissions {
        permissions_of(&file.metadata().map_err(read_failed)?)
    } else {
        None
    };

    zip.start_file(
        entry.zip_name(),
        file_options(options, &config.encryption, mode),
    )
    .map_err(|e| ArchiveError::from_zip_write(e, destination))?;

    let mut bytes_written = 0u64;
    loop {
        let bytes_read = file.read(buffer).map_err(read_failed)?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])
            .map_err(|source| ArchiveError::WriteFailed {
                path: destination.to_path_buf(),
                source,
            })?;
        bytes_written += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }

    Ok(bytes_written)
}
