// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

pub mod settings;
pub mod submit;

use clap::{ArgAction, Args, Parser, ValueEnum};
use log::trace;
use std::num::NonZeroU32;
use std::path::PathBuf;

use ssub::job::Payload;
use ssub::settings::Settings;

/// Generate a SLURM batch script for COMMAND and submit it with sbatch.
///
/// ssub writes the job script to a temporary file, appends a copy to
/// `logs/submit_log` in the current directory, and submits it. The output of
/// sbatch is appended to the same log. When the job runs, the output of
/// COMMAND is written to `<WORK_DIR>/<TIMESTAMP>-<JOB_NAME>.out`.
///
/// Defaults for every option are read from `~/.config/ssub/settings.toml`.
/// Execute `ssub --settings` to see the settings in effect.
///
/// EXAMPLES
///
/// * Preview the script for a 2 node job without submitting it:
///
///   ssub -D -n 2 -j sim "mpirun ./sim"
///
/// * Load a module before running the command:
///
///   ssub -t 4:00:00 -m 20G "python run.py" "module load python"
///
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about,
    disable_version_flag = true,
    arg_required_else_help = true
)]
pub struct Options {
    #[command(flatten)]
    pub job: JobArguments,

    #[command(flatten)]
    pub global: GlobalOptions,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// When to print colored output.
    #[arg(long, value_name="WHEN", value_enum, default_value_t=ColorMode::Auto, env="SSUB_COLOR", display_order=2)]
    pub color: ColorMode,

    /// Disable the progress spinner.
    #[arg(long, env = "SSUB_NO_PROGRESS", display_order = 2)]
    pub no_progress: bool,

    /// Increase logging verbosity (repeat for more).
    #[arg(long, action = ArgAction::Count, display_order = 2)]
    pub verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect when to print colored output.
    Auto,

    /// Always print colored output.
    Always,

    /// Never print colored output.
    Never,
}

#[derive(Args, Debug, Clone)]
pub struct JobArguments {
    /// Print the script and save a copy in `logs/` instead of submitting it.
    #[arg(short = 'D', long = "dryrun", display_order = 0)]
    pub dry_run: bool,

    /// Show the settings in effect and exit.
    #[arg(short, long, display_order = 0)]
    pub settings: bool,

    /// Number of nodes.
    #[arg(short = 'n', long, value_name = "INT", display_order = 1)]
    pub nodes: Option<NonZeroU32>,

    /// Number of tasks per node.
    #[arg(short = 'N', long, value_name = "INT", display_order = 1)]
    pub ntasks_per_node: Option<NonZeroU32>,

    /// Walltime.
    #[arg(short = 't', long, value_name = "H:MM:SS", display_order = 1)]
    pub walltime: Option<String>,

    /// Memory per node.
    #[arg(short = 'm', long, value_name = "INTG", display_order = 1)]
    pub memory: Option<String>,

    /// Working directory of the job [default: current directory].
    #[arg(short = 'd', long, value_name = "PATH", display_order = 1)]
    pub work_dir: Option<PathBuf>,

    /// Job name.
    #[arg(short = 'j', long, value_name = "NAME", display_order = 1)]
    pub job_name: Option<String>,

    /// Account to charge.
    #[arg(short = 'A', long, value_name = "NAME", env = "SSUB_ACCOUNT", display_order = 1)]
    pub account: Option<String>,

    /// Partition to submit to.
    #[arg(short = 'P', long, value_name = "NAME", env = "SSUB_PARTITION", display_order = 1)]
    pub partition: Option<String>,

    /// Notification email address. Pass "" to disable notifications [default: your user name].
    #[arg(short = 'E', long, value_name = "EMAIL", env = "SSUB_EMAIL", display_order = 1)]
    pub email: Option<String>,

    /// The scheduler's submission program.
    #[arg(long, value_name = "PATH", env = "SSUB_SBATCH", display_order = 1)]
    pub sbatch: Option<String>,

    /// The command to run.
    #[arg(required_unless_present = "settings")]
    pub command: Option<String>,

    /// A command to run before COMMAND.
    pub setup_one: Option<String>,

    /// A second command to run before COMMAND.
    pub setup_two: Option<String>,
}

impl JobArguments {
    /// Override `settings` with every option given on the command line.
    pub fn apply(&self, settings: &mut Settings) {
        trace!("Applying command line options to the settings.");

        if let Some(ref job_name) = self.job_name {
            settings.job_name.clone_from(job_name);
        }
        if let Some(nodes) = self.nodes {
            settings.nodes = nodes;
        }
        if let Some(ntasks_per_node) = self.ntasks_per_node {
            settings.ntasks_per_node = ntasks_per_node;
        }
        if let Some(ref memory) = self.memory {
            settings.memory.clone_from(memory);
        }
        if let Some(ref walltime) = self.walltime {
            settings.walltime.clone_from(walltime);
        }
        if self.work_dir.is_some() {
            settings.work_dir.clone_from(&self.work_dir);
        }
        if self.account.is_some() {
            settings.account.clone_from(&self.account);
        }
        if self.partition.is_some() {
            settings.partition.clone_from(&self.partition);
        }
        if self.email.is_some() {
            settings.email.clone_from(&self.email);
        }
        if let Some(ref sbatch) = self.sbatch {
            settings.sbatch.clone_from(sbatch);
        }
    }

    /// The commands given on the command line.
    pub fn payload(&self) -> Payload {
        Payload {
            command: self.command.clone().unwrap_or_default(),
            setup: [self.setup_one.clone(), self.setup_two.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use serial_test::parallel;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("ssub").chain(args.iter().copied()))
    }

    #[test]
    #[parallel]
    fn verify_command() {
        Options::command().debug_assert();
    }

    #[test]
    #[parallel]
    fn short_and_long_flags() {
        let short = parse(&[
            "-D", "-n", "2", "-N", "4", "-t", "2:00:00", "-m", "20G", "-d", "/w", "-j", "foo",
            "-A", "a", "-P", "p", "-E", "e@x", "echo hi",
        ])
        .unwrap();
        let long = parse(&[
            "--dryrun",
            "--nodes",
            "2",
            "--ntasks-per-node",
            "4",
            "--walltime",
            "2:00:00",
            "--memory",
            "20G",
            "--work-dir",
            "/w",
            "--job-name",
            "foo",
            "--account",
            "a",
            "--partition",
            "p",
            "--email",
            "e@x",
            "echo hi",
        ])
        .unwrap();

        for options in [short, long] {
            let job = options.job;
            assert!(job.dry_run);
            assert_eq!(job.nodes, NonZeroU32::new(2));
            assert_eq!(job.ntasks_per_node, NonZeroU32::new(4));
            assert_eq!(job.walltime.as_deref(), Some("2:00:00"));
            assert_eq!(job.memory.as_deref(), Some("20G"));
            assert_eq!(job.work_dir, Some(PathBuf::from("/w")));
            assert_eq!(job.job_name.as_deref(), Some("foo"));
            assert_eq!(job.account.as_deref(), Some("a"));
            assert_eq!(job.partition.as_deref(), Some("p"));
            assert_eq!(job.email.as_deref(), Some("e@x"));
            assert_eq!(job.command.as_deref(), Some("echo hi"));
        }
    }

    #[test]
    #[parallel]
    fn positional_commands() {
        let options = parse(&["run", "setup 1", "setup 2"]).unwrap();
        assert_eq!(
            options.job.payload(),
            Payload {
                command: "run".into(),
                setup: [Some("setup 1".into()), Some("setup 2".into())],
            }
        );

        let error = parse(&["run", "a", "b", "c"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    #[parallel]
    fn empty_email() {
        let options = parse(&["-E", "", "run"]).unwrap();
        assert_eq!(options.job.email.as_deref(), Some(""));
    }

    #[test]
    #[parallel]
    fn usage_errors() {
        let error = parse(&[]).unwrap_err();
        assert_eq!(
            error.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );

        let error = parse(&["-D"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);

        let error = parse(&["--bogus", "run"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownArgument);

        let error = parse(&["run", "-n"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidValue);

        let error = parse(&["-n", "0", "run"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    #[parallel]
    fn settings_without_command() {
        let options = parse(&["-s"]).unwrap();
        assert!(options.job.settings);
        assert!(options.job.command.is_none());
    }

    #[test]
    #[parallel]
    fn informational() {
        assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(
            parse(&["-v"]).unwrap_err().kind(),
            ErrorKind::DisplayVersion
        );
        assert_eq!(
            parse(&["--version"]).unwrap_err().kind(),
            ErrorKind::DisplayVersion
        );
    }

    #[test]
    #[parallel]
    fn apply_overrides() {
        let options = parse(&["-n", "3", "-E", "", "-j", "foo", "run"]).unwrap();
        let mut settings = Settings {
            email: Some("someone".into()),
            account: Some("acct".into()),
            ..Settings::default()
        };
        options.job.apply(&mut settings);

        assert_eq!(settings.nodes.get(), 3);
        assert_eq!(settings.email.as_deref(), Some(""));
        assert_eq!(settings.job_name, "foo");
        assert_eq!(settings.account.as_deref(), Some("acct"));
        assert_eq!(settings.ntasks_per_node.get(), 28);
        assert_eq!(settings.memory, "10G");
    }
}
