use crate::extract::{run_extract, ExtractArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use greenhouse_report::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Greenhouse Recruiting Report",
    about = "Extract recruiting data from the Greenhouse Harvest API as a single report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service with the extraction form (default command)
    Serve(ServeArgs),
    /// Run one extraction and write the report to a file
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Extract(args) => run_extract(args).await,
    }
}
