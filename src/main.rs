// Warden: sensitive-access graph analyzer
//
// Loads access graphs from JSON and reports which nodes can reach
// sensitive resources, how quickly, and along which paths.

use clap::Parser;
use warden_analyzer::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing (stderr keeps stdout clean for JSON output)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Run the appropriate command
    if let Err(err) = cli::run(&cli) {
        let code = cli::report_failure(&err, cli.output);
        std::process::exit(code);
    }
}
