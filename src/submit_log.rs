// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use log::{debug, trace};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::job::{JobRequest, Timestamp};
use crate::{Error, LOG_DIRECTORY_NAME, SUBMIT_LOG_FILE_NAME};

/// Separates entries in the submit log.
const SEPARATOR: &str =
    "================================================================================";

/// The `logs/` directory and the append-only submit log inside it.
#[derive(Debug)]
pub struct SubmitLog {
    directory: PathBuf,
    path: PathBuf,
}

impl SubmitLog {
    /// Open the log directory under `root`, creating it when needed.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error::DirectoryCreate)` when the directory cannot
    /// be created.
    ///
    pub fn open(root: &Path) -> Result<Self, Error> {
        let directory = root.join(LOG_DIRECTORY_NAME);
        fs::create_dir_all(&directory)
            .map_err(|e| Error::DirectoryCreate(directory.clone(), e))?;

        let path = directory.join(SUBMIT_LOG_FILE_NAME);
        trace!("Using submit log '{}'.", path.display());
        Ok(Self { directory, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the submit log for appending.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error::FileWrite)` when the file cannot be opened.
    ///
    pub fn open_append(&self) -> Result<File, Error> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::FileWrite(self.path.clone(), e))
    }

    /// Append an entry recording `script`.
    ///
    /// The entry is written with a single call so that entries from
    /// concurrent invocations do not interleave.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error::FileWrite)` when the entry cannot be written.
    ///
    pub fn append(&self, timestamp: &Timestamp, script: &str) -> Result<(), Error> {
        let mut entry = String::with_capacity(script.len() + 2 * SEPARATOR.len() + 32);
        entry.push_str(SEPARATOR);
        entry.push('\n');
        entry.push_str(timestamp.as_str());
        entry.push('\n');
        entry.push_str(SEPARATOR);
        entry.push('\n');
        entry.push_str(script);
        if !script.ends_with('\n') {
            entry.push('\n');
        }

        let mut file = self.open_append()?;
        file.write_all(entry.as_bytes())
            .map_err(|e| Error::FileWrite(self.path.clone(), e))?;

        debug!("Appended job script to '{}'.", self.path.display());
        Ok(())
    }

    /// Copy the script at `script_path` to `logs/<timestamp>-<job name>`.
    ///
    /// # Returns
    /// `Ok(PathBuf)` with the path to the copy.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error::FileCopy)` when the copy fails.
    ///
    pub fn save_copy(
        &self,
        script_path: &Path,
        job: &JobRequest,
        timestamp: &Timestamp,
    ) -> Result<PathBuf, Error> {
        let destination = self.directory.join(job.file_stem(timestamp));
        fs::copy(script_path, &destination)
            .map_err(|e| Error::FileCopy(script_path.into(), destination.clone(), e))?;

        debug!("Saved a copy of the job script to '{}'.", destination.display());
        Ok(destination)
    }
}
