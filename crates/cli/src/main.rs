//! `routetypes` command line: generate TypeScript route types, or print
//! the consolidated JSON-Schema document they are generated from.

#![forbid(unsafe_code)]

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
mod config;

/// Crates whose events are shown for a plain `ROUTETYPES_LOG` level.
const LOG_TARGETS: [&str; 3] = ["routetypes", "routetypes_core", "routetypes_common"];

#[derive(Parser)]
#[command(
    name = "routetypes",
    version,
    about = "Generate TypeScript route types from JSON-Schema route definitions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the configured TypeScript outputs
    Generate(cli::generate::GenerateArgs),
    /// Print the consolidated JSON-Schema document
    Schema(cli::schema::SchemaArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let code = run(std::env::args_os()).await;
    std::process::exit(code);
}

async fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(args).await,
            Some(Commands::Schema(args)) => cli::schema::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // ROUTETYPES_LOG is either a plain level ("debug") or a full filter
    // spec like "routetypes_core=trace,routetypes=info"
    let filter = match std::env::var("ROUTETYPES_LOG") {
        Ok(level) if is_plain_level(&level) => plain_level_filter(&level),
        Ok(spec) => spec,
        Err(_) => plain_level_filter("info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn plain_level_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
