mod cli;
mod commands;
mod form;
mod infra;
mod routes;
mod server;

use guard_report::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
