//! Shared test utilities for vcs-bridge integration tests.
//!
//! Collaborators are scripted fakes so that worker and dispatcher behavior
//! can be driven without a running service.

pub mod assertions;
pub mod backend;
pub mod fixtures;
pub mod local;
