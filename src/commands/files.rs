//! Subcommands that run one operation on a list of files and print the
//! resulting state of those files.

use crate::commands::session::{Session, SessionOptions};
use crate::core::{
    error::Result,
    operation::Operation,
    output::{format_file_line, print_section_header},
    CacheUsage,
};
use std::path::PathBuf;

fn run_on_files<F>(options: &SessionOptions, files: Vec<String>, build: F) -> Result<()>
where
    F: FnOnce(Vec<PathBuf>) -> Operation,
{
    let mut session = Session::open(options)?;
    let targets = session.resolve(&files);

    let outcome = session.run(build(targets.clone()));
    print_files(&mut session, &targets);
    outcome
}

fn print_files(session: &mut Session, files: &[PathBuf]) {
    if files.is_empty() {
        return;
    }
    print_section_header("Files");
    for state in session.provider.get_state(files, CacheUsage::Use) {
        let relative = session.display_path(&state.path);
        println!("{}", format_file_line(&relative, &state.status));
    }
    println!();
}

pub fn execute_checkout(options: &SessionOptions, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, Operation::check_out)
}

pub fn execute_add(options: &SessionOptions, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, Operation::mark_for_add)
}

pub fn execute_delete(options: &SessionOptions, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, Operation::delete)
}

pub fn execute_resolve(options: &SessionOptions, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, Operation::resolve)
}

/// With no files, everything in the repository is reverted
pub fn execute_revert(options: &SessionOptions, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, Operation::revert)
}

pub fn execute_submit(options: &SessionOptions, message: String, files: Vec<String>) -> Result<()> {
    run_on_files(options, files, |targets| Operation::check_in(message, targets))
}

pub fn execute_copy(options: &SessionOptions, source: String, destination: String) -> Result<()> {
    let mut session = Session::open(options)?;
    let mut targets = session.resolve(&[source, destination]);
    let destination = targets.pop().unwrap_or_default();
    let source = targets.pop().unwrap_or_default();

    let outcome = session.run(Operation::copy(source, destination.clone()));
    print_files(&mut session, &[destination]);
    outcome
}

pub fn execute_fetch(options: &SessionOptions) -> Result<()> {
    let mut session = Session::open(options)?;
    session.run(Operation::fetch(true))
}
