use clap::{Parser, Subcommand};
use std::env;
use vcs_bridge::commands::*;
use vcs_bridge::core::{
    error::{Result, VcsBridgeError},
    print_error,
};

#[derive(Parser)]
#[command(name = "vcs-bridge")]
#[command(about = "Revision control for large binary asset repositories")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Revision control service URL, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the state of files (all files needing attention by default)
    Status {
        files: Vec<String>,
    },
    /// Lock files for editing
    Checkout {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Mark new files for add
    Add {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Lock and delete files
    Delete {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Lock the destination of a file copy
    Copy {
        source: String,
        destination: String,
    },
    /// Submit files
    Submit {
        /// Commit message
        #[arg(short, long)]
        message: String,
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Revert files, or everything when no files are given
    Revert {
        files: Vec<String>,
    },
    /// Mark conflicted files as resolved
    Resolve {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Fetch from the remote and refresh all content
    Fetch,
    /// Show the revision history of a file
    History {
        file: String,
    },
    /// Show connection and repository details
    Info,
}

fn run(command: Commands, options: &SessionOptions) -> Result<()> {
    match command {
        Commands::Status { files } => execute_status(options, files),
        Commands::Checkout { files } => execute_checkout(options, files),
        Commands::Add { files } => execute_add(options, files),
        Commands::Delete { files } => execute_delete(options, files),
        Commands::Copy {
            source,
            destination,
        } => execute_copy(options, source, destination),
        Commands::Submit { message, files } => execute_submit(options, message, files),
        Commands::Revert { files } => execute_revert(options, files),
        Commands::Resolve { files } => execute_resolve(options, files),
        Commands::Fetch => execute_fetch(options),
        Commands::History { file } => execute_history(options, file),
        Commands::Info => execute_info(options),
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let options = SessionOptions {
        service_url: cli.service_url,
    };

    if let Err(e) = run(cli.command, &options) {
        if let VcsBridgeError::NotInGitRepo = e {
            print_error("Not in a git repository");
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(1);
    }
}
