use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::check_command;

#[derive(Parser)]
#[command(
    name = "es5check",
    about = "A build-time gate that verifies emitted JS assets are ES5 compatible",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the es5check configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check build output assets for ES5 compatibility (default command)
    Check {
        /// Directory containing the finalized build output
        #[arg(default_value = "dist")]
        dir: String,

        /// Parse in-process instead of spawning the external validator
        #[arg(long)]
        no_spawn: bool,

        /// Path to an acorn-compatible validator binary
        #[arg(long)]
        validator: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Check {
            dir,
            no_spawn,
            validator,
        }) => {
            check_command(&dir, cli.config.as_deref(), no_spawn, validator.as_deref())?;
        }
        None => {
            // Default to check command with its defaults
            check_command("dist", cli.config.as_deref(), false, None)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("es5check=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("es5check=info"), // -v: info messages
        _ => EnvFilter::new("es5check=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
