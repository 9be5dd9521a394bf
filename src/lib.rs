// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

pub mod job;
pub mod progress_styles;
pub mod scheduler;
pub mod script;
pub mod settings;
pub mod submit_log;

use std::io;
use std::path::PathBuf;

/// Directory (relative to the invocation location) that holds all logs.
pub const LOG_DIRECTORY_NAME: &str = "logs";

/// Append-only log of every submission and the scheduler's response.
pub const SUBMIT_LOG_FILE_NAME: &str = "submit_log";

/// Errors that may be encountered when using the ssub crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // OS errors
    #[error("No home directory")]
    NoHome(),

    #[error("Unable to determine the current directory: {0}")]
    CurrentDirectory(#[source] io::Error),

    // IO errors
    #[error("Unable to read '{0}': {1}")]
    FileRead(PathBuf, #[source] io::Error),

    #[error("Unable to write '{0}': {1}")]
    FileWrite(PathBuf, #[source] io::Error),

    #[error("Unable to copy '{0}' to '{1}': {2}")]
    FileCopy(PathBuf, PathBuf, #[source] io::Error),

    #[error("Unable to remove '{0}': {1}")]
    FileRemove(PathBuf, #[source] io::Error),

    #[error("Unable to create a temporary script file: {0}")]
    TempFileCreate(#[source] io::Error),

    #[error("Unable to create directory '{0}': {1}")]
    DirectoryCreate(PathBuf, #[source] io::Error),

    #[error("Non-UTF-8 path '{0}'")]
    NonUTF8Path(PathBuf),

    #[error("Unable to spawn '{0}': {1}.")]
    SpawnProcess(String, #[source] io::Error),

    // serialization errors
    #[error("Unable to parse '{0}'.\n{1}")]
    TOMLParse(PathBuf, #[source] toml::de::Error),

    #[error("Unable to render the job script: {0}")]
    Template(#[from] tinytemplate::error::Error),

    // job request errors
    #[error("Invalid walltime '{0}': expected H:MM:SS or D-H:MM:SS.")]
    InvalidWalltime(String),

    #[error("Invalid memory '{0}': expected an integer with an optional K, M, G, or T suffix.")]
    InvalidMemory(String),

    #[error("Invalid job name '{0}': it must be non-empty and contain no '/' or whitespace.")]
    InvalidJobName(String),

    #[error("Settings must be resolved before building a job request.")]
    UnresolvedSettings,

    #[error("No command given.")]
    MissingCommand,
}
