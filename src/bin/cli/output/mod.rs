//! Terminal progress rendering for the `analyze` subcommand.
//!
//! Kept separate from `commands::analyze` so the progress/spinner
//! concern doesn't get tangled with pipeline orchestration, mirroring
//! how the teacher splits "what to compute" from "how to show it".

use indicatif::{ProgressBar, ProgressStyle};

/// Build a throughput spinner for a non-quiet run. `ProgressBar`'s update
/// methods take `&self`, so one instance can be shared into a `FnMut`
/// progress callback without extra synchronization.
pub fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {pos} records ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar
}

/// Render one progress update onto `bar`.
pub fn report_progress(bar: &ProgressBar, update: &zonerisk::core::pipeline::ProgressUpdate) {
    bar.set_position(update.records_processed);
    bar.set_message(format!(
        "{:.0} rec/s, {} MiB",
        update.current_throughput, update.memory_usage_mib
    ));
}
