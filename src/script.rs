// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use log::{debug, trace};
use serde::Serialize;
use shell_quote::Quote;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tinytemplate::TinyTemplate;

use crate::job::{JobRequest, Timestamp};
use crate::Error;

/// The job script template.
static JOB_TEMPLATE: &str = include_str!("templates/job.sh");

/// Rendering context for `JOB_TEMPLATE`.
#[derive(Serialize)]
struct ScriptContext<'a> {
    job_name: &'a str,
    account: Option<&'a str>,
    partition: Option<&'a str>,
    nodes: u32,
    ntasks_per_node: u32,
    walltime: &'a str,
    memory: &'a str,
    work_dir: &'a str,
    mail_type: &'static str,
    email: &'a str,
    profile: String,
    setup_one: Option<&'a str>,
    setup_two: Option<&'a str>,
    command: &'a str,
    setup_one_quoted: String,
    setup_two_quoted: String,
    command_quoted: String,
    output_path: String,
}

fn quote(value: &str) -> String {
    <shell_quote::Bash as Quote<String>>::quote(value)
}

fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str().ok_or_else(|| Error::NonUTF8Path(path.into()))
}

/// Make the job script for the given request.
///
/// Directive values and the executed commands are inserted verbatim. The
/// echoed copies of the commands, the profile, and the output path are quoted.
///
/// # Errors
/// Returns `Err(ssub::Error)` when a path is not valid UTF-8 or the template
/// fails to render.
///
pub fn make_script(job: &JobRequest, timestamp: &Timestamp) -> Result<String, Error> {
    let [setup_one, setup_two] = &job.payload.setup;
    let output_path = job.output_path(timestamp);

    let context = ScriptContext {
        job_name: &job.job_name,
        account: job.account.as_deref(),
        partition: job.partition.as_deref(),
        nodes: job.nodes.get(),
        ntasks_per_node: job.ntasks_per_node.get(),
        walltime: &job.walltime,
        memory: &job.memory,
        work_dir: path_str(&job.work_dir)?,
        mail_type: if job.email.is_empty() { "NONE" } else { "ALL" },
        email: &job.email,
        profile: quote(path_str(&job.profile)?),
        setup_one: setup_one.as_deref(),
        setup_two: setup_two.as_deref(),
        command: &job.payload.command,
        setup_one_quoted: quote(setup_one.as_deref().unwrap_or_default()),
        setup_two_quoted: quote(setup_two.as_deref().unwrap_or_default()),
        command_quoted: quote(&job.payload.command),
        output_path: quote(path_str(&output_path)?),
    };

    let mut template = TinyTemplate::new();
    template.set_default_formatter(&tinytemplate::format_unescaped);
    template.add_template("job", JOB_TEMPLATE)?;

    trace!("Rendering the script for job '{}'.", job.job_name);
    Ok(template.render("job", &context)?)
}

/// A job script written to a uniquely named temporary file.
///
/// The file is removed when `ScriptFile` is dropped. Call `remove` to remove
/// it explicitly and observe any error.
///
pub struct ScriptFile {
    file: NamedTempFile,
}

impl ScriptFile {
    /// Write `script` to a new temporary file in the system temporary directory.
    ///
    /// The file name starts with `<timestamp>-<job name>-`.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error)` when the file cannot be created or written.
    ///
    pub fn create(script: &str, job: &JobRequest, timestamp: &Timestamp) -> Result<Self, Error> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", job.file_stem(timestamp)))
            .suffix(".sh")
            .tempfile()
            .map_err(Error::TempFileCreate)?;

        file.write_all(script.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::FileWrite(file.path().into(), e))?;

        debug!("Wrote job script to '{}'.", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the temporary file.
    ///
    /// # Errors
    /// Returns `Err(ssub::Error::FileRemove)` when the file cannot be removed.
    ///
    pub fn remove(self) -> Result<(), Error> {
        let path: PathBuf = self.file.path().into();
        trace!("Removing '{}'.", path.display());
        self.file.close().map_err(|e| Error::FileRemove(path, e))
    }
}
