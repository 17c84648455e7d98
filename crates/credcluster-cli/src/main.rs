// credcluster entry point

use std::process::ExitCode;

use clap::Parser;
use credcluster_cli::{logging, output::OutputStyle, runner, Cli, RunConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may live in a local .env file
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let style = OutputStyle::new(!cli.no_color && atty::is(atty::Stream::Stderr));

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", style.error(&e.user_message()));
            return ExitCode::from(e.exit_code());
        }
    };

    match runner::run(&config).await {
        Ok(summary) => {
            tracing::debug!(?summary, "Run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", style.error(&e.user_message()));
            ExitCode::from(e.exit_code())
        }
    }
}
