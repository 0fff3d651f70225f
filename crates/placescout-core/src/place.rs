//! The normalized activity model shared by every candidate source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Fallback image served when a source record carries no usable photo.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400";

/// Which backing source a search resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    External,
    Local,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::External => write!(f, "external"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown source kind '{0}', expected 'external' or 'local'")]
pub struct UnknownSourceKind(pub String);

impl std::str::FromStr for SourceKind {
    type Err = UnknownSourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external" => Ok(SourceKind::External),
            "local" => Ok(SourceKind::Local),
            other => Err(UnknownSourceKind(other.to_owned())),
        }
    }
}

/// One resolution query. Constructed per incoming request, never mutated.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub initial_radius_meters: f64,
    pub max_results: usize,
    pub source: SourceKind,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A normalized place/activity record, the only shape crossing the service
/// boundary. Built fresh per request; `distance_meters` is always relative
/// to that request's origin and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Stable within one source; unique only within one response set.
    pub id: String,
    pub title: String,
    /// May be empty; the external provider carries no descriptions.
    pub description: String,
    pub image_url: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub distance_meters: f64,
    pub booking_url: String,
    pub age_range: AgeRange,
    pub people_range: PeopleRange,
    pub time_window: TimeWindow,
    pub price: Option<f64>,
}
