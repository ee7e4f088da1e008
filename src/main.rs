//! roster-prep CLI
//!
//! Prepares student roster exports for bulk account provisioning.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_prep::commands;
use roster_prep::roster::PrivilegeType;
use roster_prep::PrepConfig;

#[derive(Parser)]
#[command(name = "roster-prep")]
#[command(version)]
#[command(about = "Prepare student roster CSV exports for bulk account provisioning")]
struct Cli {
    /// Path to config file (default: ~/.config/roster-prep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rows at the top of the CSV to discard before data starts
    #[arg(long, global = true)]
    header_rows: Option<usize>,

    /// Privilege assigned to generated accounts (none, anonymous, member, staff, admin, super_admin)
    #[arg(long, global = true)]
    privilege: Option<PrivilegeType>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a student roster CSV into provisioning JSON
    Students {
        /// Roster CSV file
        #[arg(default_value = "data/csv/prod/students.csv")]
        path: PathBuf,

        /// Output file (default: <csv dir>/out/<csv name>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip rows that cannot be converted instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Check a student roster CSV without writing anything
    Validate {
        /// Roster CSV file
        #[arg(default_value = "data/csv/prod/students.csv")]
        path: PathBuf,

        /// Report mode - print all issues but exit with success
        #[arg(long)]
        report: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PrepConfig::load(cli.config.as_deref())?
        .with_overrides(cli.header_rows, cli.privilege);

    match cli.command {
        Commands::Students {
            path,
            output,
            skip_invalid,
        } => {
            let students = commands::students::StudentsConfig {
                input: path,
                output,
                skip_invalid,
            };
            let result = commands::students::run(&students, &config)?;

            println!(
                "Students data are generated in: {}",
                result.output_path.display()
            );
            if result.skipped > 0 {
                println!("  Skipped rows: {}", result.skipped);
            }
            Ok(())
        }
        Commands::Validate { path, report } => {
            let result = commands::validate::run(&path, &config)?;

            // Exit with error if not in report mode and there are errors
            if !report && !result.is_valid() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
