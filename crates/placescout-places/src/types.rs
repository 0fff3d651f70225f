//! Raw response types for the provider's nearby-search endpoint.
//!
//! These model the provider's native record shape and never cross the crate
//! boundary; every record is normalized into a `Place` before leaving the
//! adapter.

use serde::Deserialize;

/// Top-level envelope of a nearby-search response.
///
/// `status` is `"OK"` on success, `"ZERO_RESULTS"` for an empty match set,
/// and an error code otherwise; `error_message` accompanies error statuses.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceRecord>,
}

/// One raw place record as returned by the provider.
#[derive(Debug, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub place_id: Option<String>,
    pub name: String,
    /// Short human-readable address; absent for some feature types.
    #[serde(default)]
    pub vicinity: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRef {
    pub photo_reference: String,
}
