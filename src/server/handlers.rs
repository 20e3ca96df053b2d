use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::geo::Coordinate;
use crate::hours::{is_open_now, local_now, next_open_description};
use crate::ranking::{count_within, rank_with_distance, RankOptions, RankedLocation};
use crate::report::{ReportCategory, ReportErrors, ReportForm};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn parse_origin(lat: Option<f64>, lon: Option<f64>) -> Result<Coordinate, ApiError> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon' parameters"));
    };
    Coordinate::validated(lat, lon).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid coordinates ({}). Lat: -90..90, Lon: -180..180", e),
        )
    })
}

fn parse_max_miles(max: Option<f64>, default: f64) -> Result<f64, ApiError> {
    match max {
        None => Ok(default),
        Some(m) if m.is_finite() && m >= 0.0 => Ok(m),
        Some(m) => Err(api_error(StatusCode::BAD_REQUEST, format!("Invalid max_miles '{}'", m))),
    }
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    source: String,
    locations: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        source: state.origin.to_string(),
        locations: state.locations.len(),
    })
}

// ─── GET /api/locations ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocationsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_miles: Option<f64>,
    pub nearby_only: Option<bool>,
    pub open_now: Option<bool>,
    pub tz: Option<String>,
}

#[derive(Serialize)]
pub struct LocationView {
    #[serde(flatten)]
    pub ranked: RankedLocation,
    pub is_open: bool,
    pub status: String,
    pub next_open: String,
}

#[derive(Serialize)]
pub struct LocationsResponse {
    pub origin: Coordinate,
    pub source: String,
    pub tz: String,
    pub count: usize,
    pub locations: Vec<LocationView>,
}

pub async fn nearby_locations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationsQuery>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let start = Instant::now();

    let origin = parse_origin(params.lat, params.lon)?;
    let max_miles = parse_max_miles(params.max_miles, state.config.max_distance_miles)?;

    let tz: Tz = match params.tz.as_deref() {
        Some(s) => s
            .parse()
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Unknown timezone '{}'", s)))?,
        None => state.config.timezone,
    };
    let now = local_now(tz);

    let options = RankOptions {
        max_distance_miles: max_miles,
        nearby_only: params.nearby_only.unwrap_or(true),
        open_at: params.open_now.unwrap_or(false).then_some(now),
    };

    let locations: Vec<LocationView> = rank_with_distance(&state.locations, origin, &options)
        .into_iter()
        .map(|ranked| {
            let hours = ranked.record.hours.as_ref();
            let open = is_open_now(hours, now);
            let next_open = next_open_description(hours, now);
            LocationView {
                is_open: open.is_open,
                status: open.status,
                next_open,
                ranked,
            }
        })
        .collect();

    tracing::info!(
        lat = origin.latitude,
        lon = origin.longitude,
        max_miles,
        results = locations.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/locations"
    );

    Ok(Json(LocationsResponse {
        origin,
        source: state.origin.to_string(),
        tz: tz.name().to_string(),
        count: locations.len(),
        locations,
    }))
}

// ─── GET /api/locations/count ────────────────────────────────────

#[derive(Deserialize)]
pub struct CountQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_miles: Option<f64>,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
    pub max_miles: f64,
}

pub async fn location_count(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let origin = parse_origin(params.lat, params.lon)?;
    let max_miles = parse_max_miles(params.max_miles, state.config.max_distance_miles)?;
    Ok(Json(CountResponse {
        count: count_within(&state.locations, origin, max_miles),
        max_miles,
    }))
}

// ─── GET /api/categories ─────────────────────────────────────────

pub async fn categories() -> Json<[ReportCategory; 4]> {
    Json(ReportCategory::ALL)
}

// ─── POST /api/reports ───────────────────────────────────────────

#[derive(Serialize)]
struct ReportAccepted {
    message: &'static str,
}

#[derive(Serialize)]
struct ReportRejected {
    errors: ReportErrors,
}

pub async fn submit_report(Json(form): Json<ReportForm>) -> Response {
    let errors = form.validate();
    if !errors.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(ReportRejected { errors })).into_response();
    }

    tracing::info!(
        title = %form.title,
        category = ?form.category,
        has_image = form.image_uri.is_some(),
        "report submitted"
    );
    (
        StatusCode::CREATED,
        Json(ReportAccepted { message: "Report submitted successfully!" }),
    )
        .into_response()
}
