//! Shared setup for every subcommand.
//!
//! # Setup Steps
//! 1. **Configuration**: load settings, apply command-line overrides
//! 2. **Repository**: discover the repository root from the working directory
//! 3. **Connection**: connect to the service and wait for the first full fetch
//!
//! Polling is disabled: each invocation is one-shot.

use crate::core::{
    error::{Result, VcsBridgeError},
    operation::Operation,
    output::print_report,
    paths::{normalize, relative_to_root},
    ProviderConfig, Provider,
};
use std::env;
use std::path::{Path, PathBuf};

/// Options shared by all subcommands
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub service_url: Option<String>,
}

pub struct Session {
    pub provider: Provider,
    cwd: PathBuf,
}

impl Session {
    pub fn open(options: &SessionOptions) -> Result<Self> {
        let mut config = ProviderConfig::load()?;
        if let Some(url) = &options.service_url {
            config.service_url = url.clone();
        }
        config.poll_interval_secs = 0;

        let cwd = std::fs::canonicalize(env::current_dir()?)?;
        let mut provider = Provider::new(config)?;

        if !provider.init() {
            let reason = provider
                .last_errors()
                .into_iter()
                .next()
                .unwrap_or_else(|| "connection failed".to_string());
            return Err(VcsBridgeError::service_unavailable(reason));
        }
        provider.wait_idle();

        Ok(Self { provider, cwd })
    }

    /// Command-line paths are relative to the working directory
    pub fn resolve(&self, files: &[String]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|f| normalize(Path::new(f), &self.cwd))
            .collect()
    }

    pub fn display_path(&self, path: &Path) -> String {
        relative_to_root(path, self.provider.root())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Run synchronously, print the outcome and fail on a failed command
    pub fn run(&mut self, operation: Operation) -> Result<()> {
        let report = self.provider.run(operation)?;
        print_report(&report);
        if report.succeeded() {
            Ok(())
        } else {
            Err(VcsBridgeError::command_failed(report.operation.to_string()))
        }
    }
}
