mod cli;
mod infra;
mod migrate;
mod routes;
mod server;

use recruitify::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
