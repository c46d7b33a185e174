//! Saves and restores a [`ProgressBook`] as JSON.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::ProgressBook;

/// Errors raised while reading or writing the progress file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be opened, created, or written.
    #[error("progress file {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The file does not hold a valid progress book.
    #[error("progress file {path:?} is malformed: {source}")]
    Format {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed persistence for a [`ProgressBook`].
#[derive(Clone, Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Creates a store saving to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("progress file: {path:?}");
        Self { path }
    }

    /// Location of the progress file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the saved book, or an empty one when nothing was saved yet.
    pub fn load(&self) -> Result<ProgressBook, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(ProgressBook::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes `book` to the progress file, replacing previous contents.
    pub fn save(&self, book: &ProgressBook) -> Result<(), StoreError> {
        let file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, book).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| self.io_error(source))
    }

    /// Deletes the progress file if it exists.
    pub fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
