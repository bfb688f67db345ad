#![cfg(not(tarpaulin_include))]

use clap::Parser;
use expense_dashboard::app::{self, AppState};
use expense_dashboard::config::DashboardConfig;

/// Main entry point for the dashboard web server
///
/// Loads the expense ledger once, computes the project KPIs and serves the
/// dashboard. A ledger that cannot be loaded stops the process before any
/// page is served.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::parse();

    let session = config
        .data
        .load()
        .inspect_err(|e| log::error!("Failed to load expense data: {}", e))?;
    log::info!(
        "Executed {} of {} {}",
        session.kpis().executed,
        session.kpis().budget,
        config.data.currency
    );

    let state = AppState::new(session, config.data.schema(), config.data.currency.clone())?;
    app::run(state, &config.server.address()).await
}
