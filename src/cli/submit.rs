// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use console::style;
use indicatif::{MultiProgress, ProgressBar};
use log::{debug, info, warn};
use std::env;
use std::error::Error;
use std::io::prelude::*;
use std::time::Duration;

use ssub::job::{JobRequest, Payload, Timestamp};
use ssub::progress_styles::{self, STEADY_TICK};
use ssub::scheduler::Slurm;
use ssub::script::{self, ScriptFile};
use ssub::settings::Settings;
use ssub::submit_log::SubmitLog;

/// Generate the job script and submit it to the scheduler.
///
/// In dry run mode, print the script and save a copy in `logs/` instead.
///
pub fn submit<W: Write>(
    settings: Settings,
    payload: Payload,
    dry_run: bool,
    timestamp: &Timestamp,
    multi_progress: &MultiProgress,
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    let sbatch = settings.sbatch.clone();
    let job = JobRequest::new(settings, payload)?.with_dry_run(dry_run);
    debug!("Preparing job '{}'.", job.job_name);

    let script = script::make_script(&job, timestamp)?;
    let script_file = ScriptFile::create(&script, &job, timestamp)?;

    let root = env::current_dir().map_err(ssub::Error::CurrentDirectory)?;

    if job.dry_run {
        let log = SubmitLog::open(&root)?;
        let copy = log.save_copy(script_file.path(), &job, timestamp)?;
        info!("Would submit the following script...");
        write!(output, "{script}")?;
        script_file.remove()?;

        writeln!(
            output,
            "Dry run of job {}: saved the script to '{}' without submitting it.",
            style(&job.job_name).blue().bold(),
            copy.display()
        )?;
        output.flush()?;
        return Ok(());
    }

    let log = SubmitLog::open(&root)?;
    log.append(timestamp, &script)?;

    let progress = multi_progress.add(ProgressBar::new_spinner().with_message(format!(
        "Submitting '{}' with {sbatch}",
        job.job_name
    )));
    progress.set_style(progress_styles::uncounted_spinner());
    progress.enable_steady_tick(Duration::from_millis(STEADY_TICK));

    let slurm = Slurm::new(&sbatch);
    let result = slurm.submit(&job, script_file.path(), &log);
    progress.finish_and_clear();

    let status = result?;
    if !status.success() {
        warn!(
            "{}. See '{}' for details.",
            slurm.describe_failure(status),
            log.path().display()
        );
    }

    script_file.remove()?;

    writeln!(
        output,
        "Submitted job {}. The scheduler response is in '{}'.",
        style(&job.job_name).blue().bold(),
        log.path().display()
    )?;
    output.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use indicatif::ProgressDrawTarget;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;

    fn settings(temp: &TempDir, sbatch: &str) -> Settings {
        Settings {
            job_name: "foo".into(),
            work_dir: Some(temp.path().into()),
            email: Some(String::new()),
            profile: Some("/p".into()),
            sbatch: sbatch.into(),
            ..Settings::default()
        }
    }

    fn payload() -> Payload {
        Payload {
            command: "echo hi".into(),
            ..Payload::default()
        }
    }

    /// Run `f` with the current directory set to `directory`.
    fn in_directory<F: FnOnce()>(directory: &Path, f: F) {
        let previous = env::current_dir().unwrap();
        env::set_current_dir(directory).unwrap();
        f();
        env::set_current_dir(previous).unwrap();
    }

    #[test]
    #[serial]
    fn dry_run() {
        let temp = TempDir::new().unwrap();
        let timestamp = Timestamp::from("20240101T000000");
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut output = Vec::new();

        in_directory(temp.path(), || {
            submit(
                settings(&temp, "/not/a/path/sbatch"),
                payload(),
                true,
                &timestamp,
                &multi_progress,
                &mut output,
            )
            .unwrap();
        });

        let output = String::from_utf8(output).unwrap();
        let copy = fs::read_to_string(temp.child("logs/20240101T000000-foo").path()).unwrap();
        assert!(output.starts_with(&copy));
        assert!(output.contains("Dry run of job"));
        temp.child("logs/submit_log")
            .assert(predicates::path::missing());
    }

    #[test]
    #[serial]
    fn submit_appends_log() {
        let temp = TempDir::new().unwrap();
        let timestamp = Timestamp::from("20240101T000000");
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut output = Vec::new();

        in_directory(temp.path(), || {
            submit(
                settings(&temp, "echo"),
                payload(),
                false,
                &timestamp,
                &multi_progress,
                &mut output,
            )
            .unwrap();
        });

        let log = fs::read_to_string(temp.child("logs/submit_log").path()).unwrap();
        assert!(log.contains("20240101T000000\n"));
        assert!(log.contains("(time echo hi | tee "));

        // echo prints the path of the temporary script, which must be removed.
        let script_path = log.lines().last().unwrap();
        assert!(script_path.contains("20240101T000000-foo-"));
        assert!(!Path::new(script_path).exists());

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Submitted job"));
    }

    #[test]
    #[serial]
    fn scheduler_failure_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let timestamp = Timestamp::from("20240101T000000");
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut output = Vec::new();

        in_directory(temp.path(), || {
            submit(
                settings(&temp, "false"),
                payload(),
                false,
                &timestamp,
                &multi_progress,
                &mut output,
            )
            .unwrap();
        });

        temp.child("logs/submit_log")
            .assert(predicates::str::contains("echo hi"));
    }

    #[test]
    #[serial]
    fn invalid_request_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let timestamp = Timestamp::from("20240101T000000");
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut output = Vec::new();

        in_directory(temp.path(), || {
            let result = submit(
                Settings {
                    walltime: "1h".into(),
                    ..settings(&temp, "echo")
                },
                payload(),
                false,
                &timestamp,
                &multi_progress,
                &mut output,
            );
            assert!(result.is_err());
        });

        temp.child("logs").assert(predicates::path::missing());
    }
}
