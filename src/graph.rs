#![cfg(feature = "web")]
use crate::error::ChartError;
use crate::session::DashboardView;
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::Palette;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::error::Error;
use std::ops::Range;

type DrawResult = Result<(), Box<dyn Error>>;

/// Available graph types supported by the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphType {
    /// Vertical bars, one per label
    Bar,

    /// Horizontal bars, first label on top (rankings)
    HorizontalBar,

    /// Line through the values in label order
    Line,

    /// Share of each label in the positive total
    Pie,
}

/// Configuration options for graph generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,

    /// Type of graph to generate
    pub graph_type: GraphType,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            width: 900,
            height: 420,
            graph_type: GraphType::Bar,
        }
    }
}

/// The fixed set of dashboard charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chart {
    Monthly,
    Cumulative,
    Distribution,
    TopVendors,
    TopCategories,
}

impl Chart {
    pub const ALL: [Chart; 5] = [
        Chart::Monthly,
        Chart::Cumulative,
        Chart::Distribution,
        Chart::TopVendors,
        Chart::TopCategories,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Chart::Monthly => "monthly",
            Chart::Cumulative => "cumulative",
            Chart::Distribution => "distribution",
            Chart::TopVendors => "top_vendors",
            Chart::TopCategories => "top_categories",
        }
    }

    /// Section heading shown above the chart.
    pub fn heading(self) -> &'static str {
        match self {
            Chart::Monthly => "Monthly investment",
            Chart::Cumulative => "Cumulative project execution",
            Chart::Distribution => "Spending by cost center (%)",
            Chart::TopVendors => "Vendor ranking",
            Chart::TopCategories => "Top 10 object categories by executed amount",
        }
    }

    pub fn options(self, currency: &str) -> GraphOptions {
        let amount = format!("Amount {currency}");
        let (title, x_label, y_label, graph_type) = match self {
            Chart::Monthly => ("Monthly investment", "Month".to_string(), amount, GraphType::Bar),
            Chart::Cumulative => (
                "Cumulative execution",
                "Month".to_string(),
                format!("Cumulative {currency}"),
                GraphType::Line,
            ),
            Chart::Distribution => (
                "Share of each cost center in spending",
                String::new(),
                String::new(),
                GraphType::Pie,
            ),
            Chart::TopVendors => (
                "Top 10 vendors",
                amount,
                "Vendor".to_string(),
                GraphType::HorizontalBar,
            ),
            Chart::TopCategories => (
                "Top 10 object categories",
                "Object category".to_string(),
                amount,
                GraphType::Bar,
            ),
        };

        GraphOptions {
            title: title.to_string(),
            x_label,
            y_label,
            graph_type,
            ..GraphOptions::default()
        }
    }

    /// Label/value pairs this chart plots.
    pub fn data(self, view: &DashboardView<'_>) -> Vec<(String, f64)> {
        match self {
            Chart::Monthly => view
                .monthly
                .iter()
                .map(|m| (m.period.to_string(), to_f64(m.total)))
                .collect(),
            Chart::Cumulative => view
                .cumulative
                .iter()
                .map(|c| (c.period.to_string(), to_f64(c.cumulative)))
                .collect(),
            Chart::Distribution => groups(&view.category_totals),
            Chart::TopVendors => groups(&view.top_vendors),
            Chart::TopCategories => groups(&view.top_categories),
        }
    }

    pub fn render(self, view: &DashboardView<'_>, currency: &str) -> Result<String, ChartError> {
        create_graph(&self.data(view), &self.options(currency))
    }
}

fn groups(totals: &[crate::aggregate::GroupTotal]) -> Vec<(String, f64)> {
    totals
        .iter()
        .map(|g| (g.label.clone(), to_f64(g.total)))
        .collect()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Creates an SVG graph from label/value pairs
///
/// This is the main entry point for chart rendering. It delegates to the
/// appropriate graph type generator and returns the SVG document as a string.
/// Empty data renders a captioned placeholder rather than failing.
///
/// # Arguments
/// * `data` - Label/value pairs in display order
/// * `options` - Graph styling and type options
///
/// # Returns
/// * A Result containing the SVG markup or an error
///
/// # Examples
/// ```
/// use expense_dashboard::graph::{GraphOptions, GraphType, create_graph};
///
/// let options = GraphOptions {
///     title: "Monthly investment".to_string(),
///     graph_type: GraphType::Bar,
///     ..GraphOptions::default()
/// };
/// let data = vec![("2024-01".to_string(), 100.0), ("2024-02".to_string(), 250.0)];
///
/// match create_graph(&data, &options) {
///     Ok(svg) => println!("Graph created successfully: {} bytes", svg.len()),
///     Err(e) => eprintln!("Failed to create graph: {}", e),
/// }
/// ```
pub fn create_graph(data: &[(String, f64)], options: &GraphOptions) -> Result<String, ChartError> {
    let mut svg = String::new();

    let result = if data.is_empty() {
        draw_empty(&mut svg, options)
    } else {
        match options.graph_type {
            GraphType::Bar => draw_bar_graph(&mut svg, data, options),
            GraphType::HorizontalBar => draw_horizontal_bar_graph(&mut svg, data, options),
            GraphType::Line => draw_line_graph(&mut svg, data, options),
            GraphType::Pie => draw_pie_graph(&mut svg, data, options),
        }
    };

    result.map_err(|e| ChartError::Render {
        chart: options.title.clone(),
        message: e.to_string(),
    })?;
    Ok(svg)
}

/// Value axis covering every value and zero, with a little headroom.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if max > min { max - min } else { 1.0 };
    let pad = span * 0.05;
    let lo = if min < 0.0 { min - pad } else { 0.0 };
    let hi = if max > 0.0 || min >= 0.0 { max + pad.max(f64::EPSILON) } else { 0.0 };
    lo..hi
}

/// Short axis and bar labels: 1.2K, 3.4M, 1.1B.
fn compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let head: String = label.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

fn draw_empty(svg: &mut String, options: &GraphOptions) -> DrawResult {
    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(&options.title, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data for the current filters",
        (w as i32 / 2 - 120, h as i32 / 2),
        ("sans-serif", 16).into_font().color(&BLACK.mix(0.6)),
    ))?;
    root.present()?;
    Ok(())
}

fn draw_bar_graph(svg: &mut String, data: &[(String, f64)], options: &GraphOptions) -> DrawResult {
    let labels: Vec<String> = data.iter().map(|(l, _)| truncate_label(l, 18)).collect();
    let n = data.len() as u32;
    let y_range = value_range(data.iter().map(|(_, v)| *v));

    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..n).into_segmented(), y_range)?;

    let x_formatter = |v: &SegmentValue<u32>| segment_label(&labels, v);
    let y_formatter = |v: &f64| compact(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(data.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(6)
            .data(data.iter().enumerate().map(|(i, (_, v))| (i as u32, *v))),
    )?;

    // Value on top of each bar.
    let value_style = ("sans-serif", 12)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
        Text::new(
            compact(*v),
            (SegmentValue::CenterOf(i as u32), *v),
            value_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_horizontal_bar_graph(
    svg: &mut String,
    data: &[(String, f64)],
    options: &GraphOptions,
) -> DrawResult {
    // First entry is drawn on top, so keys count down.
    let n = data.len() as u32;
    let labels: Vec<String> = data
        .iter()
        .rev()
        .map(|(l, _)| truncate_label(l, 28))
        .collect();
    let x_range = value_range(data.iter().map(|(_, v)| *v));

    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(200)
        .build_cartesian_2d(x_range, (0u32..n).into_segmented())?;

    let x_formatter = |v: &f64| compact(*v);
    let y_formatter = |v: &SegmentValue<u32>| segment_label(&labels, v);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(data.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(GREEN.mix(0.7).filled())
            .margin(4)
            .data(
                data.iter()
                    .enumerate()
                    .map(|(i, (_, v))| (n - 1 - i as u32, *v)),
            ),
    )?;

    root.present()?;
    Ok(())
}

fn draw_line_graph(svg: &mut String, data: &[(String, f64)], options: &GraphOptions) -> DrawResult {
    let labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    let n = data.len() as u32;
    let y_range = value_range(data.iter().map(|(_, v)| *v));

    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..n).into_segmented(), y_range)?;

    let x_formatter = |v: &SegmentValue<u32>| segment_label(&labels, v);
    let y_formatter = |v: &f64| compact(*v);
    chart
        .configure_mesh()
        .x_labels(data.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let points: Vec<(SegmentValue<u32>, f64)> = data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (SegmentValue::CenterOf(i as u32), *v))
        .collect();

    chart.draw_series(LineSeries::new(points.iter().cloned(), &RED))?;
    chart.draw_series(
        points
            .iter()
            .map(|point| Circle::new(point.clone(), 3, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_pie_graph(svg: &mut String, data: &[(String, f64)], options: &GraphOptions) -> DrawResult {
    // Refunds and zero totals have no meaningful share.
    let slices: Vec<&(String, f64)> = data.iter().filter(|(_, v)| *v > 0.0).collect();
    if slices.is_empty() {
        return draw_empty(svg, options);
    }

    let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v).collect();
    let labels: Vec<String> = slices.iter().map(|(l, _)| truncate_label(l, 24)).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| {
            let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
            RGBColor(r, g, b)
        })
        .collect();

    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(&options.title, ("sans-serif", 22))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 12).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 11).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()?;
    Ok(())
}
