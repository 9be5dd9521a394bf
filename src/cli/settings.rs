// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use log::{debug, info};
use std::error::Error;
use std::io::Write;

use ssub::settings::Settings;

/// Show the settings.
///
/// Print the resolved settings to stdout in toml format. Malformed values are
/// reported as errors instead of being shown.
///
pub fn settings<W: Write>(settings: &Settings, output: &mut W) -> Result<(), Box<dyn Error>> {
    debug!("Showing settings.");
    settings.validate()?;

    info!("Settings in effect:");
    write!(output, "{}", &toml::to_string_pretty(settings)?)?;

    Ok(())
}
