//! Bounded radius-expansion search over a candidate source.
//!
//! [`resolve`] runs the source at the requested radius and, when a search
//! comes back empty, doubles the radius and tries again up to
//! [`MAX_RADIUS_DOUBLINGS`] extra attempts. Emptiness is the only retry
//! trigger: a genuine source fault at radius R would recur at 2R, so faults
//! are returned immediately.

use std::future::Future;

use thiserror::Error;

use crate::geo::Coordinate;
use crate::place::{Place, SearchRequest};

/// Extra widened attempts after the initial radius comes back empty.
/// With the default 2 000 m radius the search never exceeds 8 000 m.
pub const MAX_RADIUS_DOUBLINGS: u32 = 2;

/// A backing source of candidate places around a coordinate.
///
/// Implementations return already-normalized [`Place`] records with
/// `distance_meters` populated relative to `origin`. They hold no mutable
/// state shared between requests and are safe to call concurrently.
pub trait CandidateSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_candidates(
        &self,
        origin: Coordinate,
        radius_meters: f64,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Place>, Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum ResolveError<E> {
    /// Every attempt came back empty. A reportable empty-result condition,
    /// not a fault.
    #[error("no candidates within {final_radius_meters} m after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        final_radius_meters: f64,
    },
    /// The source itself failed; never retried.
    #[error(transparent)]
    Source(E),
}

/// Resolves a search request against `source`, widening the radius on
/// empty results.
///
/// Attempts run sequentially: an early hit makes later attempts moot, and
/// parallel attempts would waste outbound calls at the primary source.
///
/// # Errors
///
/// - [`ResolveError::Exhausted`] when all attempts return no candidates.
/// - [`ResolveError::Source`] as soon as the source reports a fault.
pub async fn resolve<S: CandidateSource>(
    source: &S,
    request: &SearchRequest,
) -> Result<Vec<Place>, ResolveError<S::Error>> {
    let mut radius = request.initial_radius_meters;
    let mut attempt: u32 = 1;

    loop {
        let candidates = source
            .fetch_candidates(request.origin, radius, request.category.as_deref())
            .await
            .map_err(ResolveError::Source)?;

        if !candidates.is_empty() {
            tracing::debug!(
                attempt,
                radius_meters = radius,
                count = candidates.len(),
                "search produced candidates"
            );
            return Ok(candidates);
        }

        if attempt > MAX_RADIUS_DOUBLINGS {
            return Err(ResolveError::Exhausted {
                attempts: attempt,
                final_radius_meters: radius,
            });
        }

        radius *= 2.0;
        attempt += 1;
        tracing::warn!(
            attempt,
            radius_meters = radius,
            "no candidates found, widening search radius"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::place::SourceKind;

    #[derive(Debug, Error)]
    #[error("stub source failure")]
    struct StubError;

    /// Scripted source: pops one pre-programmed result per call and records
    /// the radius each call was made with.
    struct StubSource {
        script: Mutex<VecDeque<Result<Vec<Place>, StubError>>>,
        radii: Mutex<Vec<f64>>,
    }

    impl StubSource {
        fn new(script: Vec<Result<Vec<Place>, StubError>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                radii: Mutex::new(Vec::new()),
            }
        }

        fn radii(&self) -> Vec<f64> {
            self.radii.lock().unwrap().clone()
        }
    }

    impl CandidateSource for StubSource {
        type Error = StubError;

        async fn fetch_candidates(
            &self,
            _origin: Coordinate,
            radius_meters: f64,
            _category: Option<&str>,
        ) -> Result<Vec<Place>, StubError> {
            self.radii.lock().unwrap().push(radius_meters);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("source called more often than scripted")
        }
    }

    fn place_at(distance_meters: f64) -> Place {
        Place {
            id: format!("place-{distance_meters}"),
            title: "Stub".to_owned(),
            description: String::new(),
            image_url: String::new(),
            address: String::new(),
            coordinate: Coordinate::new(0.0, 0.0).unwrap(),
            distance_meters,
            booking_url: String::new(),
            age_range: crate::place::AgeRange::default(),
            people_range: crate::place::PeopleRange::default(),
            time_window: crate::place::TimeWindow::default(),
            price: None,
        }
    }

    fn request(radius: f64) -> SearchRequest {
        SearchRequest {
            origin: Coordinate::new(48.1351, 11.5820).unwrap(),
            initial_radius_meters: radius,
            max_results: 3,
            source: SourceKind::External,
            category: None,
        }
    }

    #[tokio::test]
    async fn first_non_empty_attempt_wins() {
        let source = StubSource::new(vec![Ok(vec![place_at(100.0)])]);

        let places = resolve(&source, &request(2_000.0)).await.expect("resolve");
        assert_eq!(places.len(), 1);
        assert_eq!(source.radii(), vec![2_000.0]);
    }

    #[tokio::test]
    async fn empty_results_double_radius_until_hit() {
        let source = StubSource::new(vec![
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![place_at(5_500.0), place_at(7_000.0)]),
        ]);

        let places = resolve(&source, &request(2_000.0)).await.expect("resolve");
        assert_eq!(places.len(), 2);
        assert_eq!(source.radii(), vec![2_000.0, 4_000.0, 8_000.0]);
    }

    #[tokio::test]
    async fn exhaustion_after_exactly_three_attempts() {
        let source = StubSource::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![])]);

        let err = resolve(&source, &request(2_000.0)).await.unwrap_err();
        match err {
            ResolveError::Exhausted {
                attempts,
                final_radius_meters,
            } => {
                assert_eq!(attempts, 3);
                assert!((final_radius_meters - 8_000.0).abs() < f64::EPSILON);
            }
            ResolveError::Source(e) => panic!("expected Exhausted, got Source({e})"),
        }
        // Never a fourth call: popping past the script would panic above.
        assert_eq!(source.radii().len(), 3);
    }

    #[tokio::test]
    async fn source_fault_propagates_without_retry() {
        let source = StubSource::new(vec![Err(StubError)]);

        let err = resolve(&source, &request(2_000.0)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Source(StubError)));
        assert_eq!(source.radii().len(), 1);
    }

    #[tokio::test]
    async fn fault_on_widened_attempt_also_propagates() {
        let source = StubSource::new(vec![Ok(vec![]), Err(StubError)]);

        let err = resolve(&source, &request(1_000.0)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Source(StubError)));
        assert_eq!(source.radii(), vec![1_000.0, 2_000.0]);
    }
}
