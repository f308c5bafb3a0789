mod cli;
mod extract;
mod infra;
mod routes;
mod server;

use greenhouse_report::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
