//! Staged output files.
//!
//! Output is written to a hidden temporary file in the target's directory and
//! renamed over the target only when complete. A staged file that is dropped
//! without [`StagedFile::commit`] is deleted, so a failed operation never
//! leaves a truncated archive or a partially decrypted file behind.

use std::io;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const STAGING_PREFIX: &str = ".zipkit-";
const STAGING_SUFFIX: &str = ".partial";

/// A temporary file that replaces `target` on commit.
///
/// # Examples
///
/// ```no_run
/// use std::io::Write;
/// use zipkit_core::io::StagedFile;
///
/// let mut staged = StagedFile::new("/tmp/out/result.bin")?;
/// staged.write_all(b"complete contents")?;
/// staged.commit()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Creates a temporary file next to `target`.
    ///
    /// The target's parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new(target: impl Into<PathBuf>) -> io::Result<Self> {
        let target = target.into();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)?;

        Ok(Self { temp, target })
    }

    /// Returns the path that will be replaced on commit.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns the current location of the temporary file.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Flushes and atomically renames the temporary file over the target.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or renaming fails. The temporary file is
    /// removed in that case.
    pub fn commit(mut self) -> io::Result<()> {
        self.temp.flush()?;
        self.temp
            .persist(&self.target)
            .map(drop)
            .map_err(|e| e.error)
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

impl Seek for StagedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.temp.seek(pos)
    }
}
