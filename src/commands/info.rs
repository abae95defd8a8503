use crate::commands::session::{Session, SessionOptions};
use crate::core::{error::Result, output::print_section_header};
use colored::*;
use std::fmt::Display;

fn print_row(label: &str, value: impl Display) {
    println!("  {} {}", format!("{:<12}", label).bright_black(), value);
}

/// Print connection and repository details
pub fn execute_info(options: &SessionOptions) -> Result<()> {
    let session = Session::open(options)?;
    let summary = session.provider.status_summary();
    let none = || "-none-".to_string();

    print_section_header("Revision control");
    print_row("Repository", summary.repository_root.display());
    print_row("User", &summary.user);
    print_row("Branch", summary.branch.unwrap_or_else(none));
    print_row("Commit", summary.commit.unwrap_or_else(none));
    print_row(
        "Available",
        if summary.available { "yes".green() } else { "no".red() },
    );
    if let Some(error) = summary.last_error {
        print_row("Last error", error.red());
    }
    println!();

    Ok(())
}
