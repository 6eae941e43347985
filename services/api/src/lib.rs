mod artifacts;
mod cli;
mod infra;
mod routes;
mod server;
mod simulate;

use loan_simulator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
