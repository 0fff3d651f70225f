//! Final ordering and truncation of resolved candidates.

use crate::place::Place;

/// Orders candidates ascending by distance from the query origin and keeps
/// the closest `max_results`.
///
/// The sort is stable so equidistant candidates keep their source order,
/// which keeps responses deterministic. Pure; an empty input yields an
/// empty output.
#[must_use]
pub fn select_nearest(mut candidates: Vec<Place>, max_results: usize) -> Vec<Place> {
    candidates.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    candidates.truncate(max_results);
    candidates
}
