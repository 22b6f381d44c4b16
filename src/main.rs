//! NoteChat CLI entry point.

use clap::Parser;
use notechat::cli::commands;
use notechat::cli::{Cli, Commands};
use notechat::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let data_dir = cli.data_dir.as_deref();
    let json = cli.json;

    match &cli.command {
        Commands::Reindex { force } => commands::index::execute_reindex(*force, data_dir, json),
        Commands::Sync => commands::index::execute_sync(data_dir, json),
        Commands::Upsert { id } => commands::index::execute_upsert(id, data_dir, json),
        Commands::Clear => commands::index::execute_clear(data_dir, json),
        Commands::Query { text, k } => commands::query::execute(text, *k, data_dir, json),
        Commands::Status => commands::status::execute(data_dir, json),
        Commands::Version => commands::version::execute(json),
    }
}
