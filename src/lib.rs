/*!
# Expense Dashboard

A browser-based financial dashboard for a single capital project, built in Rust.

## Overview

The dashboard loads the project's expense ledger from a spreadsheet, compares
what has been executed against the injected budget, and lets the user drill
into the spending by object category and vendor. The filtered movements can be
downloaded back as a spreadsheet.

## Architecture

### Core pipeline
- **Data Loader** (`loader`) - Reads xlsx/xls/ods (calamine) or CSV, drops
  incomplete rows, derives the year-month period of each record
- **Metrics Calculator** (`metrics`) - Budget, executed, balance and execution
  ratio over the whole ledger
- **Filter Engine** (`filter`) - Dependent object category → vendor selections
  with an explicit "select all" variant
- **Aggregation Pipeline** (`aggregate`) - Monthly and cumulative totals,
  category totals, top-N rankings
- **Session** (`session`) - The loaded ledger plus KPIs; turns one filter
  request into a complete dashboard view

### Presentation Layer
- **Technologies**: axum, handlebars, plotters (SVG)
- **Components**:
  - KPI tiles (`format`)
  - Charts: monthly bars, cumulative line, category pie, vendor and category
    rankings (`graph`)
  - Movement tables and download links (`app`)

### Export
- Filtered view to XLSX (rust_xlsxwriter) or CSV (`downloader`)

## HTTP Endpoints

- `/` - Dashboard page
- `/api/options` - Category options and the vendors available for them
- `/api/dashboard` - KPIs and every dataset as JSON
- `/charts/{chart}` - One chart as SVG
- `/export.xlsx`, `/export.csv` - Filtered movements download

Every endpoint takes the current selection as repeated `objects` and
`vendors` query parameters.
*/

pub mod aggregate;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod metrics;
pub mod record;
pub mod session;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

pub use error::{ChartError, ExportError, LoadError};
pub use filter::{FilterEngine, FilteredView, ResolvedFilter, SELECT_ALL, Selection};
pub use metrics::Kpis;
pub use record::{Period, Record, Schema, Table};
pub use session::{DashboardView, FilterRequest, Session};
