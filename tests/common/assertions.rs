//! Predicates for validating vcs-bridge command output

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

pub fn service_unreachable() -> impl Predicate<str> {
    predicates::str::contains("Unable to connect to the revision control service")
}

pub const SUBCOMMANDS: [&str; 11] = [
    "status", "checkout", "add", "delete", "copy", "submit", "revert", "resolve", "fetch",
    "history", "info",
];
