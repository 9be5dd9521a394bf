// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use log::{debug, trace};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::job::JobRequest;
use crate::submit_log::SubmitLog;
use crate::Error;

/// The `Slurm` scheduler submits job scripts with `sbatch`.
pub struct Slurm {
    executable: String,
}

impl Slurm {
    /// Construct a new Slurm scheduler that submits with `executable`.
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Build the submission command for `job` and the script at `script_path`.
    fn command(&self, job: &JobRequest, script_path: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        if let Some(ref partition) = job.partition {
            command.arg(format!("--partition={partition}"));
        }
        if let Some(ref account) = job.account {
            command.arg(format!("--account={account}"));
        }
        command.arg(script_path);
        command
    }

    /// Submit the job script and wait for the submission program to exit.
    ///
    /// Both stdout and stderr of the submission program are appended to `log`.
    ///
    /// # Returns
    /// `Ok(ExitStatus)` when the submission program ran. The caller decides
    /// what to do with an unsuccessful status.
    ///
    /// # Errors
    /// * `ssub::Error::FileWrite` when the log cannot be opened.
    /// * `ssub::Error::SpawnProcess` when the program cannot be started.
    ///
    pub fn submit(
        &self,
        job: &JobRequest,
        script_path: &Path,
        log: &SubmitLog,
    ) -> Result<ExitStatus, Error> {
        debug!("Submitting '{}' with {}.", job.job_name, self.executable);

        let mut command = self.command(job, script_path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.open_append()?))
            .stderr(Stdio::from(log.open_append()?));

        trace!("Waiting for {} to complete.", self.executable);
        command
            .status()
            .map_err(|e| Error::SpawnProcess(self.executable.clone(), e))
    }

    /// Describe an unsuccessful exit status of the submission program.
    pub fn describe_failure(&self, status: ExitStatus) -> String {
        match status.code() {
            None => match status.signal() {
                None => format!("{} was terminated by a unknown signal", self.executable),
                Some(signal) => format!("{} was terminated by signal {signal}", self.executable),
            },
            Some(code) => format!("{} exited with code {code}", self.executable),
        }
    }
}
