//! HTTP handlers for soil matching

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::envelope::{ApiError, ApiResponse, ErrorCode, TableMeta, TableSource};
use crate::advisory::{self, MeasurementInput, Recommendation};
use crate::config::OperatingEnvelope;
use crate::matcher::ProfileTable;

/// Shared, read-only state for all handlers
#[derive(Clone)]
pub struct ApiState {
    pub table: Arc<ProfileTable>,
    pub envelope: OperatingEnvelope,
    source: TableSource,
}

impl ApiState {
    pub fn new(table: Arc<ProfileTable>, envelope: OperatingEnvelope) -> Self {
        let source = if table.profiles() == ProfileTable::builtin().profiles() {
            TableSource::Builtin
        } else {
            TableSource::Configured
        };
        Self {
            table,
            envelope,
            source,
        }
    }

    /// Built-in table and default envelope.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(ProfileTable::builtin().clone()),
            OperatingEnvelope::default(),
        )
    }

    pub fn table_meta(&self) -> TableMeta {
        TableMeta {
            source: self.source,
            profiles: self.table.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub table: TableMeta,
}

/// GET /health
pub async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        table: state.table_meta(),
    })
}

/// GET /api/v1/profiles - The active soil table with spans
pub async fn get_profiles(State(state): State<ApiState>) -> Response {
    ApiResponse::new(state.table.as_ref(), state.table_meta()).into_response()
}

/// POST /api/v1/match - Match a JSON `MeasurementInput`
pub async fn post_match(
    State(state): State<ApiState>,
    body: Result<Json<MeasurementInput>, JsonRejection>,
) -> Result<ApiResponse<Recommendation>, ApiError> {
    let Json(input) = body?;
    respond_match(&state, input)
}

/// GET /api/v1/match?thrust_kn=..&torque_knm=..&speed_rpm=..
pub async fn get_match(
    State(state): State<ApiState>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> Result<ApiResponse<Recommendation>, ApiError> {
    let Query(query) = query?;
    respond_match(&state, query.input())
}

fn respond_match(
    state: &ApiState,
    input: MeasurementInput,
) -> Result<ApiResponse<Recommendation>, ApiError> {
    let rec = advisory::recommend(&state.table, &state.envelope, input)?;
    debug!(soil_type = %rec.soil_type, quality = %rec.quality, "Match served");
    Ok(ApiResponse::new(rec, state.table_meta()))
}

/// Form fields arrive as strings; an empty field means "not entered".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid value '{s}': {e}"))),
    }
}

/// Query for the match endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub thrust_kn: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub torque_knm: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub speed_rpm: Option<f64>,
}

impl MatchQuery {
    const fn input(&self) -> MeasurementInput {
        MeasurementInput::new(self.thrust_kn, self.torque_knm, self.speed_rpm)
    }
}

/// Query for the ranking endpoint
#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub thrust_kn: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub torque_knm: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub speed_rpm: Option<f64>,
    /// Limit the number of candidates returned
    #[serde(default, deserialize_with = "blank_as_none")]
    pub top: Option<usize>,
}

impl RankQuery {
    const fn input(&self) -> MeasurementInput {
        MeasurementInput::new(self.thrust_kn, self.torque_knm, self.speed_rpm)
    }
}

/// One scored candidate in a ranking
#[derive(Debug, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub index: usize,
    pub soil_type: String,
    pub rop_mean: f64,
    pub distance: f64,
    pub all_in_range: bool,
}

/// GET /api/v1/rank - Every profile in selection order
pub async fn get_rank(
    State(state): State<ApiState>,
    query: Result<Query<RankQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<RankedCandidate>>, ApiError> {
    let Query(query) = query?;
    let reading = query.input().into_reading()?;

    let limit = query.top.unwrap_or(usize::MAX);
    let ranked = state
        .table
        .rank(&reading)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, m)| RankedCandidate {
            rank: i + 1,
            index: m.index,
            soil_type: m.soil_type().to_string(),
            rop_mean: m.rop_mean,
            distance: m.distance,
            all_in_range: m.all_in_range,
        })
        .collect();
    Ok(ApiResponse::new(ranked, state.table_meta()))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "No such endpoint")
}
