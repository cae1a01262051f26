//! Where requested files live on disk.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::TransferError;

/// The directories read and write requests are resolved against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Roots {
    read: PathBuf,
    write: PathBuf,
}

impl Roots {
    /// Creates a new `Roots`. Both may be the same directory.
    pub fn new<R: Into<PathBuf>, W: Into<PathBuf>>(read: R, write: W) -> Self {
        Self {
            read: read.into(),
            write: write.into(),
        }
    }

    /// The directory read requests are served from.
    pub fn read_dir(&self) -> &Path {
        &self.read
    }

    /// The directory write requests are stored into.
    pub fn write_dir(&self) -> &Path {
        &self.write
    }

    /// Opens `filename` under the read root.
    pub fn open_for_read(&self, filename: &str) -> Result<File, TransferError> {
        let path = resolve(&self.read, filename)?;

        File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => TransferError::FileNotFound(filename.to_string()),
            ErrorKind::PermissionDenied => TransferError::AccessViolation(filename.to_string()),
            _ => err.into(),
        })
    }

    /// Creates `filename` under the write root, truncating whatever was
    /// there before.
    pub fn create_or_truncate(&self, filename: &str) -> Result<File, TransferError> {
        let path = resolve(&self.write, filename)?;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|err| match err.kind() {
                ErrorKind::PermissionDenied => TransferError::AccessViolation(filename.to_string()),
                _ => err.into(),
            })
    }
}

/// Joins `filename` onto `root`, refusing names that could leave it.
fn resolve(root: &Path, filename: &str) -> Result<PathBuf, TransferError> {
    let relative = Path::new(filename);

    let mut components = relative.components().peekable();
    let escapes = components.peek().is_none()
        || components.any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(TransferError::AccessViolation(filename.to_string()));
    }

    Ok(root.join(relative))
}
