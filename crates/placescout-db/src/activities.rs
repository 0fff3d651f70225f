//! Database operations for the `activities` table and the local-store
//! candidate source built on top of it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use placescout_core::{
    AgeRange, CandidateSource, Coordinate, PeopleRange, Place, TimeWindow, PLACEHOLDER_IMAGE_URL,
};

use crate::DbError;

/// Soft cap on rows one geo query may return. Deliberately wider than any
/// client-facing result limit so the final cut always happens in the
/// selector, not in the store.
pub const FETCH_CAP: i64 = 25;

/// A row from the `activities` table with its computed distance.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_people: Option<i32>,
    pub max_people: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub booking_url: Option<String>,
    pub distance_meters: f64,
}

/// Input record for seeding/upserting an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub min_people: Option<i32>,
    #[serde(default)]
    pub max_people: Option<i32>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub booking_url: Option<String>,
}

/// Fetches activities within `radius_meters` of `origin`, ordered by
/// ascending distance, capped at [`FETCH_CAP`].
///
/// The SQL distance expression mirrors
/// `placescout_core::haversine_distance_meters` (mean Earth radius
/// 6 371 000 m) so in-query ordering matches in-process ranking.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_activities_near(
    pool: &PgPool,
    origin: Coordinate,
    radius_meters: f64,
    category: Option<&str>,
) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT id, title, description, image_url, location, latitude, longitude, category, \
                min_age, max_age, min_people, max_people, start_time, end_time, price, \
                booking_url, distance_meters \
         FROM ( \
             SELECT *, \
                    2.0 * 6371000.0 * asin(sqrt( \
                        pow(sin(radians(latitude - $1) / 2.0), 2) \
                        + cos(radians($1)) * cos(radians(latitude)) \
                          * pow(sin(radians(longitude - $2) / 2.0), 2) \
                    )) AS distance_meters \
             FROM activities \
             WHERE $4::TEXT IS NULL OR category = $4 \
         ) AS nearby \
         WHERE distance_meters <= $3 \
         ORDER BY distance_meters ASC \
         LIMIT $5",
    )
    .bind(origin.latitude)
    .bind(origin.longitude)
    .bind(radius_meters)
    .bind(category)
    .bind(FETCH_CAP)
    .fetch_all(pool)
    .await
}

/// Upsert activities keyed by `(title, latitude, longitude)`.
///
/// Returns the number of activities processed. All upserts run inside one
/// transaction; if any fails the whole batch rolls back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_activities(pool: &PgPool, activities: &[NewActivity]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for activity in activities {
        sqlx::query(
            "INSERT INTO activities \
                 (title, description, image_url, location, latitude, longitude, category, \
                  min_age, max_age, min_people, max_people, start_time, end_time, price, \
                  booking_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (title, latitude, longitude) DO UPDATE SET \
                 description = EXCLUDED.description, \
                 image_url   = EXCLUDED.image_url, \
                 location    = EXCLUDED.location, \
                 category    = EXCLUDED.category, \
                 min_age     = EXCLUDED.min_age, \
                 max_age     = EXCLUDED.max_age, \
                 min_people  = EXCLUDED.min_people, \
                 max_people  = EXCLUDED.max_people, \
                 start_time  = EXCLUDED.start_time, \
                 end_time    = EXCLUDED.end_time, \
                 price       = EXCLUDED.price, \
                 booking_url = EXCLUDED.booking_url, \
                 updated_at  = NOW()",
        )
        .bind(&activity.title)
        .bind(&activity.description)
        .bind(&activity.image_url)
        .bind(&activity.location)
        .bind(activity.latitude)
        .bind(activity.longitude)
        .bind(&activity.category)
        .bind(activity.min_age)
        .bind(activity.max_age)
        .bind(activity.min_people)
        .bind(activity.max_people)
        .bind(activity.start_time)
        .bind(activity.end_time)
        .bind(activity.price)
        .bind(&activity.booking_url)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

fn row_into_place(row: ActivityRow) -> Option<Place> {
    let coordinate = match Coordinate::new(row.latitude, row.longitude) {
        Ok(coordinate) => coordinate,
        Err(e) => {
            tracing::warn!(id = %row.id, error = %e, "dropping activity with invalid coordinate");
            return None;
        }
    };

    Some(Place {
        id: row.id.to_string(),
        title: row.title,
        description: row.description.unwrap_or_default(),
        image_url: row
            .image_url
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned()),
        address: row.location.unwrap_or_default(),
        coordinate,
        distance_meters: row.distance_meters,
        booking_url: row.booking_url.unwrap_or_default(),
        age_range: AgeRange {
            min: row.min_age,
            max: row.max_age,
        },
        people_range: PeopleRange {
            min: row.min_people,
            max: row.max_people,
        },
        time_window: TimeWindow {
            start: row.start_time,
            end: row.end_time,
        },
        price: row.price,
    })
}

/// Local-store adapter over the geo-indexed `activities` table.
#[derive(Clone)]
pub struct LocalStore {
    pool: PgPool,
}

impl LocalStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CandidateSource for LocalStore {
    type Error = DbError;

    async fn fetch_candidates(
        &self,
        origin: Coordinate,
        radius_meters: f64,
        category: Option<&str>,
    ) -> Result<Vec<Place>, DbError> {
        let rows = find_activities_near(&self.pool, origin, radius_meters, category).await?;
        Ok(rows.into_iter().filter_map(row_into_place).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placescout_core::{resolve, ResolveError, SearchRequest, SourceKind};

    // 48.1351 N — one degree of latitude is ~111 195 m there.
    const MUNICH_LAT: f64 = 48.1351;
    const MUNICH_LNG: f64 = 11.5820;
    const LAT_DEG_500M: f64 = 0.004_496_61;
    const LAT_DEG_1500M: f64 = 0.013_489_82;
    const LAT_DEG_3000M: f64 = 0.026_979_65;

    fn munich() -> Coordinate {
        Coordinate::new(MUNICH_LAT, MUNICH_LNG).unwrap()
    }

    fn activity(title: &str, latitude: f64, longitude: f64) -> NewActivity {
        NewActivity {
            title: title.to_owned(),
            description: Some("test activity".to_owned()),
            image_url: None,
            location: Some("München".to_owned()),
            latitude,
            longitude,
            category: None,
            min_age: None,
            max_age: None,
            min_people: None,
            max_people: None,
            start_time: None,
            end_time: None,
            price: None,
            booking_url: None,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn finds_activities_ordered_by_distance(pool: PgPool) {
        let near = activity("Eisbach Surfen", MUNICH_LAT + LAT_DEG_500M, MUNICH_LNG);
        let far = activity("Kletterzentrum", MUNICH_LAT + LAT_DEG_1500M, MUNICH_LNG);
        // Insert the farther one first to prove ordering comes from the query.
        seed_activities(&pool, &[far, near]).await.expect("seed");

        let rows = find_activities_near(&pool, munich(), 2_000.0, None)
            .await
            .expect("query");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Eisbach Surfen");
        assert_eq!(rows[1].title, "Kletterzentrum");
        assert!(
            (rows[0].distance_meters - 500.0).abs() < 10.0,
            "near distance: {}",
            rows[0].distance_meters
        );
        assert!(
            (rows[1].distance_meters - 1_500.0).abs() < 10.0,
            "far distance: {}",
            rows[1].distance_meters
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn radius_excludes_activities_beyond_it(pool: PgPool) {
        seed_activities(
            &pool,
            &[activity("Zu Weit Weg", MUNICH_LAT + LAT_DEG_3000M, MUNICH_LNG)],
        )
        .await
        .expect("seed");

        let rows = find_activities_near(&pool, munich(), 2_000.0, None)
            .await
            .expect("query");
        assert!(rows.is_empty());

        let rows = find_activities_near(&pool, munich(), 4_000.0, None)
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn category_filter_applies_when_present(pool: PgPool) {
        let mut museum = activity("Deutsches Museum", MUNICH_LAT + LAT_DEG_500M, MUNICH_LNG);
        museum.category = Some("museum".to_owned());
        let mut park = activity("Englischer Garten", MUNICH_LAT + LAT_DEG_500M, MUNICH_LNG + 0.001);
        park.category = Some("park".to_owned());
        seed_activities(&pool, &[museum, park]).await.expect("seed");

        let rows = find_activities_near(&pool, munich(), 2_000.0, Some("museum"))
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Deutsches Museum");

        let rows = find_activities_near(&pool, munich(), 2_000.0, None)
            .await
            .expect("query");
        assert_eq!(rows.len(), 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn seeding_twice_is_idempotent(pool: PgPool) {
        let batch = vec![activity("Bouldern", MUNICH_LAT, MUNICH_LNG)];
        seed_activities(&pool, &batch).await.expect("first seed");
        let mut updated = batch.clone();
        updated[0].description = Some("updated description".to_owned());
        seed_activities(&pool, &updated).await.expect("second seed");

        let rows = find_activities_near(&pool, munich(), 1_000.0, None)
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description.as_deref(), Some("updated description"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn local_store_maps_rows_into_places(pool: PgPool) {
        let mut kletterhalle = activity("Kletterhalle", MUNICH_LAT + LAT_DEG_500M, MUNICH_LNG);
        kletterhalle.min_age = Some(6);
        kletterhalle.max_people = Some(10);
        kletterhalle.price = Some(14.5);
        kletterhalle.booking_url = Some("https://example.com/book".to_owned());
        kletterhalle.image_url = None;
        seed_activities(&pool, &[kletterhalle]).await.expect("seed");

        let store = LocalStore::new(pool);
        let places = store
            .fetch_candidates(munich(), 2_000.0, None)
            .await
            .expect("fetch");

        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.title, "Kletterhalle");
        assert_eq!(place.age_range.min, Some(6));
        assert_eq!(place.people_range.max, Some(10));
        assert_eq!(place.price, Some(14.5));
        assert_eq!(place.booking_url, "https://example.com/book");
        assert_eq!(place.image_url, PLACEHOLDER_IMAGE_URL);
        assert!((place.distance_meters - 500.0).abs() < 10.0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn resolver_widens_radius_over_the_local_store(pool: PgPool) {
        seed_activities(
            &pool,
            &[activity("Weiter Draussen", MUNICH_LAT + LAT_DEG_3000M, MUNICH_LNG)],
        )
        .await
        .expect("seed");

        let store = LocalStore::new(pool);
        let request = SearchRequest {
            origin: munich(),
            initial_radius_meters: 2_000.0,
            max_results: 3,
            source: SourceKind::Local,
            category: None,
        };

        // Empty at 2 000 m, found after doubling to 4 000 m.
        let places = resolve(&store, &request).await.expect("resolve");
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].title, "Weiter Draussen");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn resolver_reports_exhaustion_on_an_empty_store(pool: PgPool) {
        let store = LocalStore::new(pool);
        let request = SearchRequest {
            origin: munich(),
            initial_radius_meters: 1_000.0,
            max_results: 3,
            source: SourceKind::Local,
            category: None,
        };

        let err = resolve(&store, &request).await.unwrap_err();
        assert!(matches!(err, ResolveError::Exhausted { attempts: 3, .. }));
    }
}
