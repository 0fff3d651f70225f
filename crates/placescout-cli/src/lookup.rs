//! Resolve command: run a nearby-activity lookup from the terminal.
//!
//! Uses the same resolver as the server, so radius widening and ranking
//! behave identically to the HTTP endpoint.

use anyhow::{bail, Context};

use placescout_core::{
    resolve, select_nearest, Coordinate, SearchRequest, SourceKind,
};
use placescout_db::LocalStore;
use placescout_places::PlacesClient;

pub async fn run(
    lat: f64,
    lng: f64,
    radius: f64,
    limit: usize,
    source: &str,
    category: Option<String>,
) -> anyhow::Result<()> {
    let origin = Coordinate::new(lat, lng).context("invalid origin coordinate")?;
    if !radius.is_finite() || radius <= 0.0 {
        bail!("radius must be positive, got {radius}");
    }

    let source: SourceKind = source.parse()?;
    tracing::info!(
        lat = origin.latitude,
        lng = origin.longitude,
        radius,
        %source,
        "resolving nearby activities"
    );
    let request = SearchRequest {
        origin,
        initial_radius_meters: radius,
        max_results: limit,
        source,
        category,
    };

    let candidates = match source {
        SourceKind::External => {
            let Ok(api_key) = std::env::var("GOOGLE_PLACES_API_KEY") else {
                bail!("GOOGLE_PLACES_API_KEY must be set for the external source");
            };
            let client = PlacesClient::new(&api_key, 30).context("building places client")?;
            resolve(&client, &request)
                .await
                .context("resolving activities from the places API")?
        }
        SourceKind::Local => {
            let pool = placescout_db::connect_pool_from_env()
                .await
                .context("connecting to the database")?;
            placescout_db::run_migrations(&pool)
                .await
                .context("running migrations")?;
            let store = LocalStore::new(pool);
            resolve(&store, &request)
                .await
                .context("resolving activities from the local store")?
        }
    };

    let places = select_nearest(candidates, request.max_results);
    println!("{}", serde_json::to_string_pretty(&places)?);

    Ok(())
}
