use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

mod common;
use common::assertions;

/// Points the binary at a config file that does not exist so defaults apply
fn vcs_bridge(dir: &TempDir) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("vcs-bridge")?;
    cmd.current_dir(dir.path())
        .env("VCS_BRIDGE_CONFIG", dir.path().join("missing-config.json"));
    Ok(cmd)
}

#[cfg(test)]
mod cli_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_every_subcommand() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let output = vcs_bridge(&dir)?.arg("--help").assert().success();

        let stdout = String::from_utf8(output.get_output().stdout.clone())?;
        for subcommand in assertions::SUBCOMMANDS {
            assert!(stdout.contains(subcommand), "missing {}", subcommand);
        }
        Ok(())
    }

    #[test]
    fn test_submit_requires_message() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        vcs_bridge(&dir)?
            .args(["submit", "Content/A.uasset"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--message"));
        Ok(())
    }

    #[test]
    fn test_status_outside_repository() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        vcs_bridge(&dir)?
            .arg("status")
            .assert()
            .failure()
            .stdout(assertions::not_in_git_repo());
        Ok(())
    }

    #[test]
    fn test_info_without_service() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        git2::Repository::init(dir.path())?;

        // Nothing listens on the discard port
        vcs_bridge(&dir)?
            .args(["--service-url", "http://127.0.0.1:9", "info"])
            .assert()
            .failure()
            .stdout(assertions::service_unreachable());
        Ok(())
    }
}
