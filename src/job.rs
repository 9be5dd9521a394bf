// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use chrono::Local;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;

use crate::settings::Settings;
use crate::Error;

static WALLTIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+-)?\d+:[0-5]\d:[0-5]\d$").expect("valid regex"));

static MEMORY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[KMGT]?$").expect("valid regex"));

/// Time at which this process started, formatted as `YYYYMMDDTHHMMSS`.
///
/// Capture the timestamp once and pass it to everything that names files
/// or writes log entries so that all artifacts of one invocation agree.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    /// Capture the current local time.
    pub fn now() -> Self {
        Self(Local::now().format("%Y%m%dT%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

/// The shell commands a job executes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    /// The primary command.
    pub command: String,

    /// Commands executed before `command`, in order.
    pub setup: [Option<String>; 2],
}

/// Everything needed to generate and submit one job script.
///
/// Construct with `JobRequest::new`, which validates all values.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRequest {
    pub job_name: String,
    pub nodes: NonZeroU32,
    pub ntasks_per_node: NonZeroU32,
    pub memory: String,
    pub walltime: String,
    pub work_dir: PathBuf,
    pub account: Option<String>,
    pub partition: Option<String>,
    pub email: String,
    pub profile: PathBuf,
    pub payload: Payload,
    pub dry_run: bool,
}

impl JobRequest {
    /// Build a job request from resolved settings and a payload.
    ///
    /// # Errors
    /// * `ssub::Error::MissingCommand` when the payload's command is empty.
    /// * `ssub::Error::InvalidJobName`, `InvalidWalltime`, or `InvalidMemory`
    ///   when the corresponding setting is malformed.
    /// * `ssub::Error::UnresolvedSettings` when `settings` has not been
    ///   through `Settings::resolve`.
    ///
    pub fn new(settings: Settings, payload: Payload) -> Result<Self, Error> {
        if payload.command.trim().is_empty() {
            return Err(Error::MissingCommand);
        }

        settings.validate()?;

        let (Some(work_dir), Some(profile)) = (settings.work_dir, settings.profile) else {
            return Err(Error::UnresolvedSettings);
        };

        trace!("Job request '{}' is valid.", settings.job_name);
        Ok(Self {
            job_name: settings.job_name,
            nodes: settings.nodes,
            ntasks_per_node: settings.ntasks_per_node,
            memory: settings.memory,
            walltime: settings.walltime,
            work_dir,
            account: settings.account,
            partition: settings.partition,
            email: settings.email.unwrap_or_default(),
            profile,
            payload,
            dry_run: false,
        })
    }

    /// Set the dry run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// File name shared by the dry run copy and the job's output file.
    pub fn file_stem(&self, timestamp: &Timestamp) -> String {
        format!("{timestamp}-{}", self.job_name)
    }

    /// Path the job tees its command output to.
    pub fn output_path(&self, timestamp: &Timestamp) -> PathBuf {
        self.work_dir
            .join(format!("{}.out", self.file_stem(timestamp)))
    }
}

pub(crate) fn validate_job_name(job_name: &str) -> Result<(), Error> {
    if job_name.is_empty() || job_name.contains('/') || job_name.contains(char::is_whitespace) {
        return Err(Error::InvalidJobName(job_name.into()));
    }
    Ok(())
}

pub(crate) fn validate_walltime(walltime: &str) -> Result<(), Error> {
    if !WALLTIME.is_match(walltime) {
        return Err(Error::InvalidWalltime(walltime.into()));
    }
    Ok(())
}

pub(crate) fn validate_memory(memory: &str) -> Result<(), Error> {
    if !MEMORY.is_match(memory) {
        return Err(Error::InvalidMemory(memory.into()));
    }
    Ok(())
}
