use std::net::SocketAddr;
use std::time::Duration;

use colored::*;
use mconnect_common::report::Report;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 16;

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    println!("{line}");
}

pub fn fat_separator() {
    println!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR));
}

pub fn aligned_line(key: &str, value: ColoredString) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.chars().count()));
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    println!(
        "{} {}{}{} {}",
        prefix,
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    );
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    println!("{space}{msg}");
}

fn counter(value: u64) -> ColoredString {
    if value == 0 {
        value.to_string().color(colors::SUCCESS)
    } else {
        value.to_string().color(colors::FAILURE).bold()
    }
}

fn percent(hits: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 * 100.0 / total as f64
    }
}

fn seconds(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

/// Human readable rendering of a finished run.
pub fn report(target: &SocketAddr, report: &Report) {
    header("connection report");
    aligned_line("Target", target.to_string().color(colors::ACCENT));
    aligned_line("Connects", report.connects.to_string().normal());
    aligned_line("Failed connects", counter(report.failed_connects));
    aligned_line("Failed reads", counter(report.failed_reads));
    aligned_line("Timeout", seconds(report.timeout).normal());

    let hosts = report.sorted_hosts();
    if !hosts.is_empty() {
        header("hits per identity");
        let total: u64 = hosts.iter().map(|(_, hits)| hits).sum();
        for (identity, hits) in hosts {
            let value = format!("{hits} ({:.1}%)", percent(hits, total));
            aligned_line(identity, value.normal());
        }
    }

    fat_separator();
    let status: ColoredString = if report.has_failures() {
        "with failures".red().bold()
    } else {
        "without failures".green().bold()
    };
    let summary = format!(
        "Run complete in {} {}",
        seconds(report.duration).bold().yellow(),
        status
    )
    .color(colors::TEXT_DEFAULT);
    centerln(&summary.to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
