mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let rules = cli.rules.as_deref();

    let result = match cli.command {
        Commands::Init { force } => cli::init::run(force),
        Commands::Formats { ext } => cli::formats::list(ext.as_deref()),
        Commands::Rules => cli::rules::list(rules),
        Commands::Report { command } => cli::report::dispatch(command, rules),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
