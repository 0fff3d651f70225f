use std::collections::HashMap;

use axum::extract::{Extension, Query, State};
use axum::Json;

use placescout_core::{
    resolve, select_nearest, Coordinate, Place, ResolveError, SearchRequest, SourceKind,
};
use placescout_db::LocalStore;

use crate::api::{ApiError, AppState, ResolveDefaults};
use crate::middleware::RequestId;

/// Upper bound on the `limit` query parameter.
const MAX_LIMIT: usize = 20;

/// GET /resolve
///
/// Resolves nearby activities for an origin coordinate, widening the search
/// radius up to two times when a lookup comes back empty. Results are sorted
/// by distance and truncated to the requested limit.
pub async fn resolve_activities(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Place>>, ApiError> {
    let request = parse_request(&params, state.defaults)?;

    tracing::info!(
        request_id = %request_id,
        lat = request.origin.latitude,
        lng = request.origin.longitude,
        radius = request.initial_radius_meters,
        source = %request.source,
        "resolving nearby activities"
    );

    let candidates = match request.source {
        SourceKind::External => {
            let Some(places) = state.places.as_deref() else {
                return Err(ApiError::new(
                    "ConfigurationMissing",
                    "no places API credential is configured",
                ));
            };
            resolve(places, &request).await.map_err(|e| {
                map_resolve_error(e, "UpstreamUnavailable", "places lookup failed", &request_id)
            })?
        }
        SourceKind::Local => {
            let store = LocalStore::new(state.pool.clone());
            resolve(&store, &request).await.map_err(|e| {
                map_resolve_error(e, "StoreUnavailable", "activity store lookup failed", &request_id)
            })?
        }
    };

    Ok(Json(select_nearest(candidates, request.max_results)))
}

fn parse_request(
    params: &HashMap<String, String>,
    defaults: ResolveDefaults,
) -> Result<SearchRequest, ApiError> {
    let latitude = required_f64(params, "lat")?;
    let longitude = required_f64(params, "lng")?;
    let origin = Coordinate::new(latitude, longitude)
        .map_err(|e| ApiError::invalid_request(e.to_string()))?;

    let initial_radius_meters = match params.get("radius") {
        Some(raw) => {
            let radius: f64 = raw
                .parse()
                .map_err(|_| ApiError::invalid_request("'radius' must be a number"))?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ApiError::invalid_request("'radius' must be positive"));
            }
            radius
        }
        None => defaults.radius_meters,
    };

    let max_results = match params.get("limit") {
        Some(raw) => {
            let limit: usize = raw
                .parse()
                .map_err(|_| ApiError::invalid_request("'limit' must be a positive integer"))?;
            limit.clamp(1, MAX_LIMIT)
        }
        None => defaults.max_results,
    };

    let source = match params.get("source") {
        Some(raw) => raw
            .parse::<SourceKind>()
            .map_err(|e| ApiError::invalid_request(e.to_string()))?,
        None => SourceKind::External,
    };

    let category = params
        .get("category")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    Ok(SearchRequest {
        origin,
        initial_radius_meters,
        max_results,
        source,
        category,
    })
}

fn required_f64(params: &HashMap<String, String>, name: &str) -> Result<f64, ApiError> {
    let raw = params
        .get(name)
        .ok_or_else(|| ApiError::invalid_request(format!("missing required parameter '{name}'")))?;
    raw.parse()
        .map_err(|_| ApiError::invalid_request(format!("'{name}' must be a number")))
}

/// Maps a resolver outcome to a client error.
///
/// Exhaustion (three empty attempts) is a client-visible condition; source
/// faults are logged with the request ID and surfaced as a generic message
/// so that upstream details and credentials never reach the client.
fn map_resolve_error<E: std::error::Error>(
    error: ResolveError<E>,
    fault_code: &'static str,
    fault_message: &'static str,
    request_id: &str,
) -> ApiError {
    match error {
        ResolveError::Exhausted {
            attempts,
            final_radius_meters,
        } => ApiError::new(
            "NoActivitiesFound",
            format!(
                "no activities found after {attempts} attempts (final radius {final_radius_meters} m)"
            ),
        ),
        ResolveError::Source(e) => {
            tracing::error!(request_id = %request_id, error = %e, "{fault_message}");
            ApiError::new(fault_code, fault_message)
        }
    }
}
