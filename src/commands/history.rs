use crate::commands::session::{Session, SessionOptions};
use crate::core::{
    error::{Result, VcsBridgeError},
    operation::Operation,
    output::{print_info, print_section_header},
};
use colored::*;

/// Print the revision history of one file, newest first
pub fn execute_history(options: &SessionOptions, file: String) -> Result<()> {
    let mut session = Session::open(options)?;
    let target = session
        .resolve(&[file.clone()])
        .pop()
        .ok_or_else(|| VcsBridgeError::file_not_found(&file))?;

    session.run(Operation::update_status(vec![target.clone()], true))?;

    let history = session.provider.history(&target);
    if history.is_empty() {
        print_info(&format!("No history for {}", session.display_path(&target)));
        return Ok(());
    }

    print_section_header(&format!("History of {}", session.display_path(&target)));
    for revision in history {
        println!(
            "  {} {} {} {} {}",
            revision.short_commit_id.yellow(),
            revision.date.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            revision.user.blue(),
            revision.action.white(),
            revision.description.lines().next().unwrap_or_default().white()
        );
    }
    println!();

    Ok(())
}
