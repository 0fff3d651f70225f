//! External-places adapter: client and normalization for the third-party
//! nearby-search provider (Google Places Nearby Search API).

mod client;
mod error;
mod normalize;
mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use normalize::{photo_url, UNKNOWN_LOCATION};
pub use types::{Geometry, LatLng, NearbySearchResponse, PhotoRef, PlaceRecord};
