// Copyright (c) 2026 The ssub developers.
// Part of ssub, released under the BSD 3-Clause License.

use indicatif::{ProgressState, ProgressStyle};
use std::fmt::Write;

pub const STEADY_TICK: u64 = 110;

/// Format the elapsed time in seconds with one decimal.
fn elapsed(state: &ProgressState, w: &mut dyn Write) {
    let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
}

/// Create a named spinner.
///
/// # Panics
/// When the progress style is invalid.
///
pub fn uncounted_spinner() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green.bold} {msg:.bold}... ({elapsed:.dim})")
        .expect("Valid template")
        .with_key("elapsed", elapsed)
        .tick_strings(&["◐", "◓", "◑", "◒", "⊙"])
}
