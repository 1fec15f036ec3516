use clap::Parser;

mod cli;
mod commands;
mod support;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.log.as_deref(), cli.verbose);

    match cli.command {
        Commands::Resolve {
            declarations,
            config,
            output,
            backend,
            json,
        } => commands::resolve::run(declarations, config, output, backend, json),

        Commands::Explain {
            declarations,
            symbol,
            config,
            json,
        } => commands::explain::run(declarations, symbol, config, json),

        Commands::Lookup {
            declarations,
            platform,
            version,
            config,
            json,
        } => commands::lookup::run(declarations, platform, version, config, json),

        Commands::Check {
            declarations,
            config,
            json,
        } => commands::check::run(declarations, config, json),

        Commands::InitConfig { path, force } => commands::init_config::run(path, force),
    }
}
