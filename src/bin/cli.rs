#![cfg(not(tarpaulin_include))]

use clap::Parser;
use expense_dashboard::config::DataArgs;
use expense_dashboard::downloader::{to_csv, to_xlsx};
use expense_dashboard::format::{FormattedKpis, format_amount};
use expense_dashboard::session::FilterRequest;
use std::path::PathBuf;

/// Print the dashboard figures to the terminal and optionally export the
/// filtered movements.
#[derive(Parser, Debug)]
#[command(name = "dashboard-cli", about = "Project expense report", version)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Object category to keep (repeatable; omit for all)
    #[arg(long = "object")]
    objects: Vec<String>,

    /// Vendor to keep (repeatable; omit for all)
    #[arg(long = "vendor")]
    vendors: Vec<String>,

    /// Write the filtered movements to this file (.xlsx or .csv)
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let session = cli
        .data
        .load()
        .inspect_err(|e| log::error!("Failed to load expense data: {}", e))?;
    let request = FilterRequest {
        objects: cli.objects.clone(),
        vendors: cli.vendors.clone(),
    };

    let kpis = FormattedKpis::new(session.kpis(), &cli.data.currency);
    println!("Injected budget   {}", kpis.budget);
    println!("Executed amount   {}", kpis.executed);
    println!("Available balance {}", kpis.balance);
    println!("Executed          {}", kpis.execution);

    let view = session.view(&request);

    println!("\nMonthly investment");
    for month in &view.cumulative {
        println!(
            "  {}  {:>16}  {:>16}",
            month.period,
            format_amount(month.total),
            format_amount(month.cumulative)
        );
    }

    println!("\nTop vendors");
    for vendor in &view.top_vendors {
        println!("  {:<40} {:>16}", vendor.label, format_amount(vendor.total));
    }

    println!("\nTop object categories");
    for category in &view.top_categories {
        println!("  {:<40} {:>16}", category.label, format_amount(category.total));
    }

    println!("\nLargest movements");
    for record in &view.top_records {
        println!(
            "  {}  {:<30} {:<30} {:>16}",
            record.date,
            record.vendor,
            record.category.as_deref().unwrap_or(""),
            format_amount(record.amount)
        );
    }

    println!(
        "\n{} movements, total {}",
        view.records.len(),
        format_amount(view.total)
    );

    if let Some(path) = &cli.export {
        let (_, filtered) = session.filtered(&request);
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let bytes = if is_csv {
            to_csv(&filtered, &cli.data.schema())?
        } else {
            to_xlsx(&filtered, &cli.data.schema())?
        };
        std::fs::write(path, bytes)?;
        println!("Exported {} movements to {}", filtered.len(), path.display());
    }

    Ok(())
}
