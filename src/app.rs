#![cfg(feature = "web")]
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Query;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::downloader::{self, CSV_FILE_NAME, XLSX_FILE_NAME, XLSX_MIME};
use crate::error::{ChartError, ExportError};
use crate::filter::SELECT_ALL;
use crate::format::{FormattedKpis, format_amount};
use crate::graph::Chart;
use crate::metrics::Kpis;
use crate::record::{Record, Schema};
use crate::session::{DashboardView, FilterRequest, Session};

const DASHBOARD_TEMPLATE: &str = include_str!("./templates/dashboard.hbs");
const ROWS_TEMPLATE: &str = include_str!("./templates/rows.hbs");
const PAGE_TITLE: &str = "Wind Farm Project Financial Dashboard";

pub struct AppState {
    session: Session,
    schema: Schema,
    currency: String,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(
        session: Session,
        schema: Schema,
        currency: impl Into<String>,
    ) -> Result<Self, handlebars::TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string("dashboard", DASHBOARD_TEMPLATE)?;
        templates.register_partial("rows", ROWS_TEMPLATE)?;

        Ok(AppState {
            session,
            schema,
            currency: currency.into(),
            templates,
        })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to render page: {0}")]
    Template(#[from] handlebars::RenderError),
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("{}", self);
        let body = StatusResponse {
            status: "error".to_string(),
            message: Some(self.to_string()),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct OptionsResponse {
    sentinel: &'static str,
    objects: Vec<String>,
    vendors: Vec<String>,
}

#[derive(Serialize)]
struct DashboardResponse<'a> {
    kpis: &'a Kpis,
    formatted: FormattedKpis,
    view: DashboardView<'a>,
}

#[derive(Serialize)]
struct SelectOption {
    label: String,
    selected: bool,
}

#[derive(Serialize)]
struct ChartSection {
    heading: &'static str,
    svg: String,
}

#[derive(Serialize)]
struct RecordRow {
    date: String,
    vendor: String,
    category: String,
    amount: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        RecordRow {
            date: record.date.format("%Y-%m-%d").to_string(),
            vendor: record.vendor.clone(),
            category: record.category.clone().unwrap_or_default(),
            amount: format_amount(record.amount),
        }
    }
}

#[derive(Serialize)]
struct PageContext {
    title: &'static str,
    kpis: FormattedKpis,
    object_options: Vec<SelectOption>,
    vendor_options: Vec<SelectOption>,
    charts: Vec<ChartSection>,
    top_records: Vec<RecordRow>,
    records: Vec<RecordRow>,
    record_count: usize,
    filtered_total: String,
    query: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/options", get(get_options))
        .route("/api/dashboard", get(get_dashboard))
        .route("/charts/:chart", get(get_chart))
        .route("/export.xlsx", get(export_xlsx))
        .route("/export.csv", get(export_csv))
        .with_state(state)
}

pub async fn run(state: AppState, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FilterRequest>,
) -> Result<Html<String>, AppError> {
    let session = &state.session;
    let view = session.view(&request);

    let object_selection = request.object_selection();
    let vendor_selection = request.vendor_selection();
    let object_options = select_options(
        session.engine().available_object_categories(),
        |label| object_selection.contains(label),
        object_selection.is_all(),
    );
    let vendor_options = select_options(
        view.filter.available_vendors.clone(),
        |label| vendor_selection.contains(label),
        vendor_selection.is_all(),
    );

    let charts = Chart::ALL
        .iter()
        .map(|chart| -> Result<ChartSection, ChartError> {
            Ok(ChartSection {
                heading: chart.heading(),
                svg: chart.render(&view, &state.currency)?,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    let context = PageContext {
        title: PAGE_TITLE,
        kpis: FormattedKpis::new(session.kpis(), &state.currency),
        object_options,
        vendor_options,
        charts,
        top_records: view.top_records.iter().map(|r| RecordRow::from(*r)).collect(),
        records: view.records.iter().map(|r| RecordRow::from(*r)).collect(),
        record_count: view.records.len(),
        filtered_total: format_amount(view.total),
        query: query_string(&request),
    };

    Ok(Html(state.templates.render("dashboard", &context)?))
}

async fn get_options(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FilterRequest>,
) -> impl IntoResponse {
    let resolved = state.session.resolve(&request);

    Json(OptionsResponse {
        sentinel: SELECT_ALL,
        objects: state.session.engine().available_object_categories(),
        vendors: resolved.available_vendors,
    })
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FilterRequest>,
) -> impl IntoResponse {
    let session = &state.session;

    Json(DashboardResponse {
        kpis: session.kpis(),
        formatted: FormattedKpis::new(session.kpis(), &state.currency),
        view: session.view(&request),
    })
    .into_response()
}

async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(chart): Path<Chart>,
    Query(request): Query<FilterRequest>,
) -> Result<Response, AppError> {
    let view = state.session.view(&request);
    let svg = chart.render(&view, &state.currency)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FilterRequest>,
) -> Result<Response, AppError> {
    let (_, view) = state.session.filtered(&request);
    let buffer = downloader::to_xlsx(&view, &state.schema)?;
    log::info!("Exporting {} filtered records to {}", view.len(), XLSX_FILE_NAME);

    Ok(attachment(buffer, XLSX_MIME, XLSX_FILE_NAME))
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FilterRequest>,
) -> Result<Response, AppError> {
    let (_, view) = state.session.filtered(&request);
    let buffer = downloader::to_csv(&view, &state.schema)?;
    log::info!("Exporting {} filtered records to {}", view.len(), CSV_FILE_NAME);

    Ok(attachment(buffer, "text/csv; charset=utf-8", CSV_FILE_NAME))
}

fn attachment(buffer: Vec<u8>, mime: &'static str, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(buffer),
    )
        .into_response()
}

/// Widget options with the "select all" sentinel first.
fn select_options(
    labels: Vec<String>,
    is_selected: impl Fn(&str) -> bool,
    all_selected: bool,
) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        label: SELECT_ALL.to_string(),
        selected: all_selected,
    })
    .chain(labels.into_iter().map(|label| SelectOption {
        selected: is_selected(&label),
        label,
    }))
    .collect()
}

/// Rebuild the filter query so download links export what is on screen.
fn query_string(request: &FilterRequest) -> String {
    let pairs: Vec<String> = request
        .objects
        .iter()
        .map(|label| format!("objects={}", urlencoding::encode(label)))
        .chain(
            request
                .vendors
                .iter()
                .map(|label| format!("vendors={}", urlencoding::encode(label))),
        )
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}
