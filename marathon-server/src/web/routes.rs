//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::calendar;
use crate::catalog::Catalog;
use crate::domain::TheaterCode;
use crate::explorer::{filter_screenings, group_by_title};
use crate::planner::{ParamError, PlanResult, Planner, SearchError};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/theaters/search", get(search_theaters))
        .route("/api/showtimes", get(showtimes))
        .route("/itineraries/plan", post(plan_itineraries))
        .route("/itineraries/calendar", post(export_calendar))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with planning form.
async fn index_page() -> impl IntoResponse {
    let template = IndexTemplate {
        today: Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Search theaters by name, location or code.
async fn search_theaters(
    State(state): State<AppState>,
    Query(req): Query<TheaterSearchRequest>,
) -> Json<TheaterSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let mode = req.by.unwrap_or(crate::theaters::SearchMode::Name);

    let theaters = state
        .directory
        .search(mode, &req.q)
        .into_iter()
        .take(limit)
        .map(TheaterResult::from_theater)
        .collect();

    Json(TheaterSearchResponse { theaters })
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Parse a JSON body, logging it on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(body), "JSON parse error: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

fn render<T: Template>(template: &T) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

/// Theaters to load for a primary theater: the cluster, or the request's
/// allow-list when one is given.
fn theaters_to_load(cluster: Vec<TheaterCode>, allowed: &[TheaterCode]) -> Vec<TheaterCode> {
    if allowed.is_empty() {
        cluster
    } else {
        allowed.to_vec()
    }
}

/// Browse a day's schedule with filters.
async fn showtimes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ShowtimesQuery>,
) -> Result<Response, AppError> {
    let primary = query.theater_code()?;
    let now = Local::now().naive_local();
    let date = parse_date(query.date.as_deref(), now.date())?;
    let filter = query.filter(now)?;

    let theaters = if query.cluster {
        state
            .directory
            .cluster(&primary)
            .ok_or_else(|| unknown_theater(&primary))?
            .theaters()
    } else {
        vec![primary]
    };

    let catalog = state.catalog.cluster_catalog(&theaters, date).await;
    let screenings = filter_screenings(&catalog.screenings, &filter, query.sort.unwrap_or_default());

    if accepts_html(&headers) {
        let name = |code: &TheaterCode| state.theater_name(code);
        let template = ShowtimesTemplate {
            date_label: date.format("%A, %B %-d").to_string(),
            titles: group_by_title(&screenings)
                .iter()
                .map(|g| TitleView::from_group(g, name))
                .collect(),
            upcoming: catalog.upcoming.iter().map(UpcomingView::from_upcoming).collect(),
        };
        render(&template)
    } else {
        Ok(Json(ShowtimesResponse {
            date: date.format("%Y-%m-%d").to_string(),
            titles: strings(catalog.titles()),
            screen_types: strings(catalog.screen_types()),
            screenings: screenings
                .iter()
                .map(|s| ScreeningResult::from_screening(s))
                .collect(),
            upcoming: catalog
                .upcoming
                .iter()
                .map(UpcomingResult::from_upcoming)
                .collect(),
        })
        .into_response())
    }
}

fn strings(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

fn unknown_theater(code: &TheaterCode) -> AppError {
    AppError::NotFound {
        message: format!("Unknown theater: {code}"),
    }
}

/// Load the cluster around the requested theater and run the planner.
async fn run_plan(state: &AppState, req: &PlanRequest) -> Result<(NaiveDate, PlanResult), AppError> {
    let primary = req.theater_code()?;
    let search = req.to_search(Local::now().date_naive())?;
    search.validate()?;

    let drive = state
        .directory
        .cluster(&primary)
        .ok_or_else(|| unknown_theater(&primary))?;

    let theaters = theaters_to_load(drive.theaters(), &search.params.theaters);
    let catalog: Catalog = state.catalog.cluster_catalog(&theaters, search.date).await;

    info!(
        theater = %primary,
        date = %search.date,
        screenings = catalog.screenings.len(),
        "planning marathon"
    );

    let result = Planner::new(&catalog.screenings, &drive).plan(&search)?;
    Ok((search.date, result))
}

/// Plan marathon itineraries.
async fn plan_itineraries(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: PlanRequest = parse_body(&body)?;
    let (date, result) = run_plan(&state, &req).await?;

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let options = result
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| OptionView::from_option(i, option, |c| state.theater_name(c)))
            .collect();

        let template = ItinerariesTemplate {
            date_label: date.format("%A, %B %-d").to_string(),
            options,
            itineraries_found: result.itineraries_found,
            candidates_checked: result.candidates_checked,
        };
        render(&template)
    } else {
        Ok(Json(PlanResponse::from_result(date, &result)).into_response())
    }
}

/// Re-plan and return one option as an iCalendar download.
async fn export_calendar(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: CalendarRequest = parse_body(&body)?;
    let (_, result) = run_plan(&state, &req.plan).await?;

    let option = result
        .options
        .get(req.option)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Option {} not available", req.option),
        })?;

    let itinerary = &option.ranked.itinerary;
    let ics = calendar::render_ics(itinerary, |c| state.theater_name(c));

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", calendar::filename(itinerary)),
            ),
        ],
        ics,
    )
        .into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<ParamError> for AppError {
    fn from(e: ParamError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidRequest(message) => AppError::BadRequest { message },
            SearchError::Params(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
