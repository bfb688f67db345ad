//! Error types for loading, exporting and charting.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to build the expense table. Always fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot read CSV file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported file type for {}, expected xlsx, xlsm, xlsb, xls, ods or csv", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("sheet {sheet:?} not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("sheet {0:?} has no header row")]
    EmptySheet(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("amounts are too large to total within the decimal range")]
    AmountOverflow,
}

/// Failure to serialize the filtered view for download.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export buffer error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to draw a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to render {chart} chart: {message}")]
    Render { chart: String, message: String },
}
