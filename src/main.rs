#![warn(clippy::pedantic)]

use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{MultiProgress, ProgressDrawTarget};
use indicatif_log_bridge::LogWrapper;
use log::{error, info};
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

mod cli;

use cli::{ColorMode, Options};
use ssub::job::Timestamp;
use ssub::settings::Settings;

fn main_detail(options: Options, timestamp: &Timestamp) -> Result<(), Box<dyn Error>> {
    let instant = Instant::now();

    let log_style;
    match options.global.color {
        ColorMode::Never => {
            log_style = "never";
            console::set_colors_enabled(false);
        }
        ColorMode::Always => {
            log_style = "always";
            console::set_colors_enabled(true);
        }
        ColorMode::Auto => {
            log_style = "auto";
        }
    }

    let log_level = match options.global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let multi_progress = if options.global.no_progress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    };

    let env = env_logger::Env::default()
        .filter_or("SSUB_LOG", log_level)
        .write_style_or("SSUB_LOG_STYLE", log_style);

    let logger = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .build();

    LogWrapper::new(multi_progress.clone(), logger).try_init()?;

    let mut output = io::stdout().lock();

    let mut settings = Settings::open()?;
    options.job.apply(&mut settings);
    let settings = settings.resolve()?;

    if options.job.settings {
        cli::settings::settings(&settings, &mut output)?;
    } else {
        cli::submit::submit(
            settings,
            options.job.payload(),
            options.job.dry_run,
            timestamp,
            &multi_progress,
            &mut output,
        )?;
    }

    output.flush()?;

    info!("Completed in {:.1}s.", instant.elapsed().as_secs_f64());

    Ok(())
}

fn main() -> ExitCode {
    let timestamp = Timestamp::now();

    let options = match Options::try_parse() {
        Ok(options) => options,
        Err(error) => {
            let _ = error.print();
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Err(error) = main_detail(options, &timestamp) {
        error!("{error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
