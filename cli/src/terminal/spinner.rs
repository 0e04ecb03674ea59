use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Spinner on stderr showing how many outcomes have been recorded.
pub fn start(connections: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(TICK_STRINGS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Starting {} probes...", connections.to_string().bold()));
    pb
}

pub fn report_progress(pb: &ProgressBar, recorded: u64) {
    pb.set_message(
        format!(
            "Recorded {} so far...",
            format!("{recorded} outcomes").green().bold()
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}
