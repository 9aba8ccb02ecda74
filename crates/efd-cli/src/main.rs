//! EFD CLI - validate, render and inspect EFD record files.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod input;
mod output;

use commands::{render, schema, validate};

#[derive(Parser)]
#[command(name = "efd")]
#[command(about = "EFD record validation, assembly and rendering CLI")]
struct Cli {
    /// Log debug detail to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate records and document structure
    Validate {
        /// Path to input JSON file
        input: String,
        /// Register layout (icms-ipi or contribuicoes)
        #[arg(long, env = "EFD_LAYOUT")]
        layout: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Exit with error code if any diagnostic is reported
        #[arg(long)]
        strict: bool,
        /// Only report registers with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Skip the record listing and print diagnostics only
        #[arg(long)]
        errors_only: bool,
    },
    /// Render records into an EFD text file
    Render {
        /// Path to input JSON file
        input: String,
        /// Output file
        #[arg(long, short)]
        output: String,
        /// Register layout (icms-ipi or contribuicoes)
        #[arg(long, env = "EFD_LAYOUT")]
        layout: Option<String>,
        /// Write the file even when diagnostics are reported
        #[arg(long)]
        allow_errors: bool,
        /// Replace the output file if it exists
        #[arg(long)]
        force: bool,
    },
    /// List register types or describe one register
    Schema {
        /// Register tag to describe
        tag: Option<String>,
        /// Register layout (icms-ipi or contribuicoes)
        #[arg(long, env = "EFD_LAYOUT")]
        layout: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "efd=debug,efd_schemas=debug,efd_core=debug,efd_document=debug"
    } else {
        "efd=info,efd_schemas=info,efd_core=info,efd_document=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            input,
            layout,
            json,
            strict,
            tag,
            errors_only,
        } => validate::run(input, layout, json, strict, tag, errors_only),
        Commands::Render {
            input,
            output,
            layout,
            allow_errors,
            force,
        } => render::run(input, output, layout, allow_errors, force),
        Commands::Schema { tag, layout, json } => schema::run(tag, layout, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
