mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Logging is initialized per subcommand (scheduler log vs stderr).
    let cli = Cli::parse();
    if let Err(err) = cli.run().await {
        eprintln!("ozi error: {:#}", err);
        std::process::exit(1);
    }
}
