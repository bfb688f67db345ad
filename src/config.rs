//! Command line and environment configuration.

use crate::error::LoadError;
use crate::format::DEFAULT_CURRENCY;
use crate::loader::load_table;
use crate::record::Schema;
use crate::session::Session;
use clap::{Args, Parser};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Where the ledger lives and how to read it.
#[derive(Args, Clone, Debug)]
pub struct DataArgs {
    /// Spreadsheet (xlsx, xls, ods) or CSV file with the expense ledger
    #[arg(long, env = "DASHBOARD_DATA", default_value = "detallefinanciero.xlsx")]
    pub data: PathBuf,

    /// Worksheet holding the ledger
    #[arg(long, env = "DASHBOARD_SHEET", default_value = "Base")]
    pub sheet: String,

    /// Total budget injected into the project
    #[arg(long, env = "DASHBOARD_BUDGET", default_value = "126000000")]
    pub budget: Decimal,

    /// Currency label shown next to amounts
    #[arg(long, env = "DASHBOARD_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    #[arg(long, env = "DASHBOARD_DATE_COLUMN", default_value = "Fecha de documento")]
    pub date_column: String,

    #[arg(long, env = "DASHBOARD_AMOUNT_COLUMN", default_value = "Val/Mon.so.CO")]
    pub amount_column: String,

    #[arg(long, env = "DASHBOARD_VENDOR_COLUMN", default_value = "Proveedor")]
    pub vendor_column: String,

    #[arg(
        long,
        env = "DASHBOARD_CATEGORY_COLUMN",
        default_value = "Denominación del objeto"
    )]
    pub category_column: String,
}

impl DataArgs {
    pub fn schema(&self) -> Schema {
        Schema {
            date: self.date_column.clone(),
            amount: self.amount_column.clone(),
            vendor: self.vendor_column.clone(),
            category: self.category_column.clone(),
        }
    }

    /// Load the ledger and compute the session KPIs.
    pub fn load(&self) -> Result<Session, LoadError> {
        let table = load_table(&self.data, &self.sheet, &self.schema())?;
        Session::new(table, self.budget)
    }
}

/// Listening address of the web dashboard.
#[derive(Args, Clone, Debug)]
pub struct ServerArgs {
    #[arg(long, env = "DASHBOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "DASHBOARD_PORT", default_value_t = 3000)]
    pub port: u16,
}

impl ServerArgs {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration of the `dashboard` web server.
#[derive(Parser, Clone, Debug)]
#[command(name = "dashboard", about = "Project expense dashboard", version)]
pub struct DashboardConfig {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub server: ServerArgs,
}
