pub mod app_config;
mod config;
pub mod geo;
pub mod place;
pub mod resolve;
pub mod select;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use geo::{haversine_distance_meters, Coordinate, CoordinateError, EARTH_RADIUS_METERS};
pub use place::{
    AgeRange, PeopleRange, Place, SearchRequest, SourceKind, TimeWindow, UnknownSourceKind,
    PLACEHOLDER_IMAGE_URL,
};
pub use resolve::{resolve, CandidateSource, ResolveError, MAX_RADIUS_DOUBLINGS};
pub use select::select_nearest;
