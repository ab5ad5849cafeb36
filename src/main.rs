use clap::Parser;
use dbt_junitxml::DbtJunitError;
use dbt_junitxml::cli::{Cli, Commands, commands};
use dbt_junitxml::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Continue without logging rather than abort the conversion
    }

    let result = match &cli.command {
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e);
    }
}

/// Report the error on stderr and exit nonzero.
fn handle_error(err: &DbtJunitError) -> ! {
    eprintln!("Error: {err}");
    if let Some(suggestion) = err.suggestion() {
        eprintln!("Hint: {suggestion}");
    }
    std::process::exit(err.exit_code());
}
