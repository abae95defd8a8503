//! Output formatting for the command-line host.
//!
//! # Design Principles
//! - **Consistent color scheme**: red for errors, yellow for warnings, blue for headers
//! - **Standardized spacing**: blank line around every block
//! - **Per-file lines**: category label, then the repository-relative path

use crate::core::classify::{classify, display_name};
use crate::core::colors::{get_aligned_category, get_colored_path};
use crate::core::command::{CommandReport, CommandResult};
use crate::core::state::FileStatus;
use colored::*;

/// Formats and prints an error message
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message.white());
}

/// Formats and prints a success message
///
/// # Format
/// ```text
///
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.blue());
}

/// One status line: aligned category, path and, for blocked files, the reason
pub fn format_file_line(relative: &str, status: &FileStatus) -> String {
    let category = classify(status);
    let label = get_aligned_category(category);
    let path = get_colored_path(category, relative);
    let detail = display_name(status);

    if detail.eq_ignore_ascii_case(category.as_str()) {
        format!("  {} {}", label, path)
    } else {
        format!("  {} {} {}", label, path, format!("({})", detail).bright_black())
    }
}

/// Print a command's messages and, unless it failed, its outcome. Failures
/// are left to the caller.
pub fn print_report(report: &CommandReport) {
    for message in &report.info_messages {
        println!("{} {}", "•".blue(), message.white());
    }
    for message in &report.error_messages {
        println!("{} {}", "✕".red(), message.white());
    }

    match report.result {
        CommandResult::Succeeded => print_success(&format!("{} succeeded", report.operation)),
        CommandResult::Failed => {}
        CommandResult::Cancelled => print_info(&format!("{} was cancelled", report.operation)),
    }
}
