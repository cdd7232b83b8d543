use clap::Parser;
use cli::{Cli, Commands};
use tracing::error;

mod annotate;
mod cli;
mod logging;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match &cli.command {
        Commands::Detect(args) => annotate::run_detect(args),
        Commands::Template(args) => annotate::run_template(args),
        Commands::Export(args) => annotate::run_export(args),
        Commands::Propagate(args) => annotate::run_propagate(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
