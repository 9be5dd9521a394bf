// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use log::{debug, trace, warn};
use nix::unistd::{self, User};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::job;
use crate::Error;

const DEFAULT_NTASKS_PER_NODE: NonZeroU32 = match NonZeroU32::new(28) {
    Some(n) => n,
    None => panic!("28 is non-zero"),
};

/// User settings
///
/// `Settings` holds the default value for every job option. The built-in
/// defaults are overridden by `$HOME/.config/ssub/settings.toml`, which is
/// in turn overridden by environment variables and command line options.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name of the job.
    pub job_name: String,

    /// Number of nodes to request.
    pub nodes: NonZeroU32,

    /// Number of tasks to launch on each node.
    pub ntasks_per_node: NonZeroU32,

    /// Memory per node, with a unit suffix.
    pub memory: String,

    /// Maximum wall-clock time in H:MM:SS.
    pub walltime: String,

    /// Directory the job executes in. Defaults to the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,

    /// Account to charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Partition to submit to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,

    /// Notification address. An empty address disables notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Shell profile sourced by the job before running any commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PathBuf>,

    /// The scheduler's submission program.
    pub sbatch: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            job_name: "untitled".into(),
            nodes: NonZeroU32::MIN,
            ntasks_per_node: DEFAULT_NTASKS_PER_NODE,
            memory: "10G".into(),
            walltime: "1:00:00".into(),
            work_dir: None,
            account: None,
            partition: None,
            email: None,
            profile: None,
            sbatch: "sbatch".into(),
        }
    }
}

impl Settings {
    /// Open the user settings.
    ///
    /// Open `$HOME/.config/ssub/settings.toml` if it exists and layer it over
    /// the built-in defaults. Set `SSUB_HOME` to read the file from a
    /// different home directory.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error)` when the file cannot be read or if there is
    /// a parse error.
    ///
    pub fn open() -> Result<Self, Error> {
        let home = match env::var("SSUB_HOME") {
            Ok(ssub_home) => PathBuf::from(ssub_home),
            Err(_) => home::home_dir().ok_or_else(Error::NoHome)?,
        };
        let settings_toml_path = home.join(".config").join("ssub").join("settings.toml");
        Self::open_from_path(settings_toml_path)
    }

    pub(crate) fn open_from_path(settings_toml_path: PathBuf) -> Result<Self, Error> {
        let settings_file = match File::open(&settings_toml_path) {
            Ok(file) => file,
            Err(error) => match error.kind() {
                io::ErrorKind::NotFound => {
                    trace!(
                        "'{}' does not exist, using built-in settings.",
                        &settings_toml_path.display()
                    );
                    return Ok(Self::default());
                }
                _ => return Err(Error::FileRead(settings_toml_path, error)),
            },
        };

        let mut buffer = BufReader::new(settings_file);
        let mut settings_string = String::new();
        buffer
            .read_to_string(&mut settings_string)
            .map_err(|e| Error::FileRead(settings_toml_path.clone(), e))?;

        trace!("Parsing '{}'.", &settings_toml_path.display());
        Self::parse_str(&settings_toml_path, &settings_string)
    }

    /// Parse `Settings` from a TOML string.
    ///
    /// Keys missing from `toml` take their built-in default values.
    ///
    pub(crate) fn parse_str(path: &Path, toml: &str) -> Result<Self, Error> {
        toml::from_str(toml).map_err(|e| Error::TOMLParse(path.into(), e))
    }

    /// Check the job name, walltime, and memory.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error)` naming the first malformed value.
    ///
    pub fn validate(&self) -> Result<(), Error> {
        job::validate_job_name(&self.job_name)?;
        job::validate_walltime(&self.walltime)?;
        job::validate_memory(&self.memory)
    }

    /// Fill in the settings that default to values from the environment.
    ///
    /// * `work_dir` becomes absolute, defaulting to the current directory.
    /// * `email` defaults to the invoking user's login name.
    /// * `profile` defaults to `$HOME/.bash_profile`.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error)` when the current directory or the home
    /// directory cannot be determined.
    ///
    pub fn resolve(mut self) -> Result<Self, Error> {
        let current_dir = env::current_dir().map_err(Error::CurrentDirectory)?;
        let work_dir = self.work_dir.take().unwrap_or_else(|| current_dir.clone());
        self.work_dir = Some(
            work_dir
                .absolutize_from(&current_dir)
                .map_err(Error::CurrentDirectory)?
                .into_owned(),
        );

        if self.email.is_none() {
            self.email = Some(login_name());
        }

        if self.profile.is_none() {
            let home = home::home_dir().ok_or_else(Error::NoHome)?;
            self.profile = Some(home.join(".bash_profile"));
        }

        debug!("Resolved settings: {self:?}");
        Ok(self)
    }
}

/// Find the login name of the user running this process.
fn login_name() -> String {
    match User::from_uid(unistd::getuid()) {
        Ok(Some(user)) => user.name,
        Ok(None) | Err(_) => env::var("USER").unwrap_or_else(|_| {
            warn!("Unable to determine the user name, disabling notifications.");
            String::new()
        }),
    }
}
