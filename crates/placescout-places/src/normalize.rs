//! Mapping of raw provider records into the normalized [`Place`] shape.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use placescout_core::{
    haversine_distance_meters, AgeRange, Coordinate, PeopleRange, Place, TimeWindow,
    PLACEHOLDER_IMAGE_URL,
};

use crate::types::PlaceRecord;

/// Address used when the provider omits a vicinity for a record.
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// Resolves a photo reference through the provider's photo-serving
/// convention. The credential here is the client-side key the provider
/// requires on photo URLs.
#[must_use]
pub fn photo_url(photo_reference: &str, api_key: &str) -> String {
    format!(
        "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference={}&key={}",
        utf8_percent_encode(photo_reference, NON_ALPHANUMERIC),
        utf8_percent_encode(api_key, NON_ALPHANUMERIC),
    )
}

/// Deep link to the provider's map search for a place name; stands in for a
/// booking URL since the external source has no native one.
fn maps_search_url(name: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

/// Maps one raw record into a [`Place`], computing `distance_meters` from
/// `origin`. The external source carries no age/people/time/price data, so
/// those fields stay unknown.
///
/// Records whose coordinates fall outside valid latitude/longitude ranges
/// are dropped with a warning.
pub(crate) fn normalize_record(
    record: PlaceRecord,
    index: usize,
    origin: Coordinate,
    api_key: &str,
) -> Option<Place> {
    let coordinate =
        match Coordinate::new(record.geometry.location.lat, record.geometry.location.lng) {
            Ok(coordinate) => coordinate,
            Err(e) => {
                tracing::warn!(name = %record.name, error = %e, "dropping record with invalid coordinate");
                return None;
            }
        };

    let image_url = record.photos.first().map_or_else(
        || PLACEHOLDER_IMAGE_URL.to_owned(),
        |photo| photo_url(&photo.photo_reference, api_key),
    );

    Some(Place {
        id: record
            .place_id
            .unwrap_or_else(|| format!("activity-{index}")),
        booking_url: maps_search_url(&record.name),
        title: record.name,
        description: String::new(),
        image_url,
        address: record.vicinity.unwrap_or_else(|| UNKNOWN_LOCATION.to_owned()),
        coordinate,
        distance_meters: haversine_distance_meters(origin, coordinate),
        age_range: AgeRange::default(),
        people_range: PeopleRange::default(),
        time_window: TimeWindow::default(),
        price: None,
    })
}
