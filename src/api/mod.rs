//! Binary-side wiring: command line, HTTP server, routes and session stores.

mod cli;
mod commands;
pub mod infra;
mod routes;
mod server;

use crate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
