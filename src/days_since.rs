//! The main entry point: resolve an address to the number of days since it last rained
//! there.
//!
//! A resolution geocodes the address, finds the nearest station, then walks the
//! station's history backwards one year at a time looking for a day with more
//! precipitation than the caller's threshold. After [`MAX_YEAR_ATTEMPTS`] misses it
//! falls back to the most recent day tagged with a `rain` or `snow` event across every
//! year it fetched.

use crate::config::Config;
use crate::error::DsirError;
use crate::geocoding::geo_locator::{GeoLocator, Geocoder};
use crate::history::fetcher::{one_year_back, HistoryFetcher, HistorySource};
use crate::history::parser::{HistoryFormat, HistoryParser};
use crate::rain_finder::{find_by_event, find_by_threshold, DEFAULT_THRESHOLD};
use crate::stations::station_resolver::{StationLookup, StationResolver};
use crate::types::daily_record::DailyRecord;
use crate::types::resolution::ResolutionResult;
use bon::bon;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Number of yearly windows searched before falling back to the event scan.
pub const MAX_YEAR_ATTEMPTS: usize = 5;

/// Orchestrates geocoding, station lookup, history retrieval and the backward scan.
///
/// Create one from process configuration with [`DaysSinceResolver::from_config`], or
/// plug in custom providers with [`DaysSinceResolver::new`]. The resolver holds no
/// per-request state and can serve many resolutions concurrently.
///
/// # Examples
///
/// ```no_run
/// # use dsir::{Config, DaysSinceResolver, DsirError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), DsirError> {
/// let resolver = DaysSinceResolver::from_config(&Config::from_env()?)?;
///
/// let result = resolver
///     .resolve()
///     .address("1600 Pennsylvania Ave NW, Washington, DC")
///     .threshold(0.1)
///     .call()
///     .await?;
///
/// println!(
///     "It last rained {} days ago ({} in on {}) at {}",
///     result.days_ago,
///     result.matched_record.precipitation,
///     result.matched_record.date,
///     result.location.address
/// );
/// # Ok(())
/// # }
/// ```
pub struct DaysSinceResolver<G = GeoLocator, S = StationResolver, H = HistoryFetcher> {
    geocoder: G,
    stations: S,
    history: H,
    format: HistoryFormat,
    retry_backoff: Duration,
}

impl DaysSinceResolver {
    /// Builds the HTTP-backed providers around one shared, connection-pooled client.
    ///
    /// # Errors
    ///
    /// Returns [`DsirError::HttpClient`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, DsirError> {
        let client = config.http_client()?;
        let geocoder = GeoLocator::new(
            client.clone(),
            &config.geocode_url,
            &config.geocode_api_key,
        );
        let stations = StationResolver::new(client.clone(), &config.station_url);
        let history = HistoryFetcher::new(client, &config.history_url, config.history_format);
        Ok(Self {
            geocoder,
            stations,
            format: history.format(),
            history,
            retry_backoff: config.retry_backoff,
        })
    }
}

/// Runs `fut` unless `token` is cancelled first.
async fn cancellable<T, E>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, DsirError>
where
    DsirError: From<E>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(DsirError::Cancelled),
        result = fut => result.map_err(DsirError::from),
    }
}

#[bon]
impl<G, S, H> DaysSinceResolver<G, S, H>
where
    G: Geocoder,
    S: StationLookup,
    H: HistorySource,
{
    /// Creates a resolver from custom providers. `format` selects the parser applied to
    /// whatever `history` returns.
    pub fn new(geocoder: G, stations: S, history: H, format: HistoryFormat) -> Self {
        Self {
            geocoder,
            stations,
            history,
            format,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Sets the pause between yearly history attempts.
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Finds how many days ago it last rained (or snowed) at `address`.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.address(&str)`: **Required.** Free-text address to geocode.
    /// * `.threshold(f64)`: Optional. Only days with precipitation strictly greater than
    ///   this count during the yearly search. Defaults to `0.0`.
    /// * `.as_of(NaiveDate)`: Optional. The date treated as "today". Defaults to the
    ///   local date.
    /// * `.cancellation(&CancellationToken)`: Optional. Cancelling the token abandons the
    ///   network call or backoff in progress.
    ///
    /// # Errors
    ///
    /// * [`DsirError::InvalidThreshold`] if the threshold is negative or not finite.
    /// * [`DsirError::Geocode`] / [`DsirError::StationLookup`] if the address cannot be
    ///   placed or no station is found.
    /// * [`DsirError::HistoryParse`] if a fetched year cannot be parsed. Records from
    ///   that year are never scanned.
    /// * [`DsirError::Transport`] for network failures and non-success responses.
    /// * [`DsirError::RainNotFound`] if neither the threshold search nor the event
    ///   fallback finds a match.
    /// * [`DsirError::Cancelled`] if the token is cancelled.
    #[builder]
    pub async fn resolve(
        &self,
        address: &str,
        threshold: Option<f64>,
        as_of: Option<NaiveDate>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ResolutionResult, DsirError> {
        let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(DsirError::InvalidThreshold(threshold));
        }
        let today = as_of.unwrap_or_else(|| Local::now().date_naive());
        let uncancellable = CancellationToken::new();
        let cancel = cancellation.unwrap_or(&uncancellable);

        debug!(
            "Looking for more than {} precipitation for address: {:?}",
            threshold, address
        );
        let location = cancellable(cancel, self.geocoder.locate(address)).await?;
        let station = cancellable(
            cancel,
            self.stations.resolve(location.latitude, location.longitude),
        )
        .await?;
        info!(
            "Resolved {:?} to station {} ({}, {})",
            location.address, station, location.latitude, location.longitude
        );

        let mut cursor = today;
        let mut all_history: Vec<DailyRecord> = Vec::new();
        let mut matched: Option<DailyRecord> = None;

        for attempt in 1..=MAX_YEAR_ATTEMPTS {
            if attempt > 1 && !self.retry_backoff.is_zero() {
                let backoff = async {
                    tokio::time::sleep(self.retry_backoff).await;
                    Ok::<(), DsirError>(())
                };
                cancellable(cancel, backoff).await?;
            }

            let raw = cancellable(cancel, self.history.fetch_year(cursor, &station)).await?;
            let year_history = self.format.parse(&raw).map_err(|source| {
                warn!("Unusable history for year ending {}: {}", cursor, source);
                DsirError::HistoryParse {
                    end_date: cursor,
                    source,
                }
            })?;
            debug!(
                "Attempt {}/{}: {} days of history ending {}",
                attempt,
                MAX_YEAR_ATTEMPTS,
                year_history.len(),
                cursor
            );

            if let Some(day) = find_by_threshold(&year_history, threshold) {
                info!("Found precipitation on {} (attempt {})", day.date, attempt);
                matched = Some(day.clone());
                break;
            }
            all_history.splice(0..0, year_history);
            cursor = one_year_back(cursor);
        }

        let matched = match matched {
            Some(day) => day,
            None => {
                warn!(
                    "No day above {} in {} years; scanning {} days for rain or snow events",
                    threshold,
                    MAX_YEAR_ATTEMPTS,
                    all_history.len()
                );
                find_by_event(&all_history)
                    .cloned()
                    .ok_or(DsirError::RainNotFound {
                        years: MAX_YEAR_ATTEMPTS,
                    })?
            }
        };

        let days_ago = u32::try_from((today - matched.date).num_days().max(0)).unwrap_or(u32::MAX);
        Ok(ResolutionResult {
            days_ago,
            matched_record: matched,
            location,
            station,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::error::GeocodeError;
    use crate::history::delimited::tests::{export, row};
    use crate::stations::error::StationLookupError;
    use crate::transport::tests::request_failure;
    use crate::transport::TransportError;
    use crate::types::location::Location;
    use crate::types::station::StationCode;
    use crate::ErrorKind;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeGeocoder {
        location: Option<Location>,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn found() -> Self {
            Self {
                location: Some(Location::new("123 Main St, Anytown, ST", 40.0, -75.0)),
                calls: AtomicUsize::new(0),
            }
        }

        fn not_found() -> Self {
            Self {
                location: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Geocoder for FakeGeocoder {
        async fn locate(&self, address: &str) -> Result<Location, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.location.clone().ok_or_else(|| GeocodeError::NoResults {
                address: address.to_string(),
            })
        }
    }

    struct FakeStations;

    impl StationLookup for FakeStations {
        async fn resolve(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> Result<StationCode, StationLookupError> {
            assert_eq!((latitude, longitude), (40.0, -75.0));
            Ok(StationCode::new("KXYZ"))
        }
    }

    /// Serves one canned export per attempt and records the requested end dates.
    struct FakeHistory {
        years: Vec<String>,
        requests: Mutex<Vec<NaiveDate>>,
        /// Zero-based attempt that fails with a transport error.
        failing_attempt: Option<usize>,
        /// Zero-based attempt that never completes.
        stalled_attempt: Option<usize>,
    }

    impl FakeHistory {
        fn new(years: Vec<String>) -> Self {
            Self {
                years,
                requests: Mutex::new(Vec::new()),
                failing_attempt: None,
                stalled_attempt: None,
            }
        }

        fn failing_on(mut self, attempt: usize) -> Self {
            self.failing_attempt = Some(attempt);
            self
        }

        fn stalling_on(mut self, attempt: usize) -> Self {
            self.stalled_attempt = Some(attempt);
            self
        }

        fn requests(&self) -> Vec<NaiveDate> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HistorySource for FakeHistory {
        async fn fetch_year(
            &self,
            end_date: NaiveDate,
            station: &StationCode,
        ) -> Result<String, TransportError> {
            assert_eq!(station.as_str(), "KXYZ");
            let attempt = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(end_date);
                requests.len() - 1
            };
            if self.failing_attempt == Some(attempt) {
                return Err(request_failure("http://history.example/KXYZ").await);
            }
            if self.stalled_attempt == Some(attempt) {
                std::future::pending::<()>().await;
            }
            Ok(self.years.get(attempt).cloned().unwrap_or_else(|| export(&[])))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_before(days: i64) -> NaiveDate {
        today() - ChronoDuration::days(days)
    }

    /// One day of export, `days` before today.
    fn day(days: i64, precip: &str, events: &str) -> String {
        row(&days_before(days).to_string(), "70", "55", precip, events)
    }

    /// A year with no precipitation and no events, ending `offset` days before today.
    fn dry_year(offset: i64) -> String {
        export(&[
            day(offset + 200, "0.00", "Fog"),
            day(offset + 100, "T", ""),
            day(offset + 1, "0.00", ""),
        ])
    }

    fn resolver(
        history: FakeHistory,
    ) -> DaysSinceResolver<FakeGeocoder, FakeStations, FakeHistory> {
        DaysSinceResolver::new(
            FakeGeocoder::found(),
            FakeStations,
            history,
            HistoryFormat::Delimited,
        )
    }

    #[tokio::test]
    async fn test_recent_rain_found_in_first_year() -> Result<(), DsirError> {
        let history = FakeHistory::new(vec![export(&[
            day(12, "0.00", ""),
            day(10, "0.40", "Rain"),
            day(3, "0.00", ""),
        ])]);
        let resolver = resolver(history);

        let result = resolver
            .resolve()
            .address("123 Main St")
            .threshold(0.0)
            .as_of(today())
            .call()
            .await?;

        assert_eq!(result.days_ago, 10);
        assert_eq!(result.matched_record.precipitation, 0.4);
        assert_eq!(result.matched_record.date, days_before(10));
        assert_eq!(
            result.location,
            Location::new("123 Main St, Anytown, ST", 40.0, -75.0)
        );
        assert_eq!(result.station, StationCode::new("KXYZ"));
        assert_eq!(resolver.history.requests(), vec![today()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_threshold_defaults_to_zero() -> Result<(), DsirError> {
        let history = FakeHistory::new(vec![export(&[day(4, "0.01", ""), day(2, "T", "Rain")])]);
        let resolver = resolver(history);

        let result = resolver.resolve().address("x").as_of(today()).call().await?;
        assert_eq!(result.days_ago, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_snow_event_found_by_fallback_after_five_attempts() -> Result<(), DsirError> {
        let history = FakeHistory::new(vec![
            export(&[day(10, "0.40", ""), day(5, "T", "")]),
            export(&[day(600, "0.30", ""), day(380, "0.00", "Snow"), day(370, "0.10", "Fog")]),
            dry_year(730),
            dry_year(1095),
            dry_year(1460),
        ]);
        let resolver = resolver(history);

        let result = resolver
            .resolve()
            .address("123 Main St")
            .threshold(1.0)
            .as_of(today())
            .call()
            .await?;

        assert_eq!(result.days_ago, 380);
        assert_eq!(result.matched_record.precipitation, 0.0);
        assert!(result.matched_record.events.contains("snow"));
        assert_eq!(
            resolver.history.requests(),
            vec![
                today(),
                days_before(365),
                days_before(730),
                days_before(1095),
                days_before(1460),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_event_only_day_in_fifth_year_is_returned() -> Result<(), DsirError> {
        let history = FakeHistory::new(vec![
            dry_year(0),
            dry_year(365),
            dry_year(730),
            dry_year(1095),
            export(&[day(1700, "0.00", ""), day(1500, "T", "Rain"), day(1470, "0.00", "")]),
        ]);
        let resolver = resolver(history);

        let result = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .call()
            .await?;

        assert_eq!(result.days_ago, 1500);
        assert!(result.matched_record.events.contains("rain"));
        assert_eq!(resolver.history.requests().len(), MAX_YEAR_ATTEMPTS);
        Ok(())
    }

    #[tokio::test]
    async fn test_all_dry_years_raise_rain_not_found() {
        let history = FakeHistory::new(vec![
            dry_year(0),
            dry_year(365),
            dry_year(730),
            dry_year(1095),
            dry_year(1460),
            // Never requested: the search stops after five years.
            export(&[day(1900, "2.00", "Rain")]),
        ]);
        let resolver = resolver(history);

        let err = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .call()
            .await
            .unwrap_err();

        assert!(matches!(err, DsirError::RainNotFound { years: MAX_YEAR_ATTEMPTS }));
        assert_eq!(err.kind(), ErrorKind::RainNotFound);
        assert_eq!(resolver.history.requests().len(), MAX_YEAR_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_threshold_match_stops_year_stepping() -> Result<(), DsirError> {
        let history = FakeHistory::new(vec![
            dry_year(0),
            dry_year(365),
            export(&[day(900, "1.20", "Rain"), day(800, "0.60", "Rain"), day(750, "0.10", "Rain")]),
        ]);
        let resolver = resolver(history);

        let result = resolver
            .resolve()
            .address("123 Main St")
            .threshold(0.5)
            .as_of(today())
            .call()
            .await?;

        assert_eq!(result.days_ago, 800);
        assert_eq!(resolver.history.requests().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_year_fails_without_using_its_records() {
        let mut broken = vec![day(400, "3.00", "Rain"), "2023-05-01,70,60<br />".to_string()];
        broken.push(day(390, "1.00", "Rain"));
        let history = FakeHistory::new(vec![dry_year(0), export(&broken)]);
        let resolver = resolver(history);

        let err = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .call()
            .await
            .unwrap_err();

        match err {
            DsirError::HistoryParse { end_date, .. } => assert_eq!(end_date, days_before(365)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(resolver.history.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_threshold_is_rejected_before_geocoding() {
        let resolver = resolver(FakeHistory::new(vec![]));
        for threshold in [-0.1, f64::NAN, f64::INFINITY] {
            let err = resolver
                .resolve()
                .address("123 Main St")
                .threshold(threshold)
                .call()
                .await
                .unwrap_err();
            assert!(matches!(err, DsirError::InvalidThreshold(_)));
        }
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geocoder_failure_propagates() {
        let resolver = DaysSinceResolver::new(
            FakeGeocoder::not_found(),
            FakeStations,
            FakeHistory::new(vec![]),
            HistoryFormat::Delimited,
        );

        let err = resolver
            .resolve()
            .address("nowhere at all")
            .call()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoResults);
        assert!(resolver.history.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_any_request() {
        let resolver = resolver(FakeHistory::new(vec![dry_year(0)]));
        let token = CancellationToken::new();
        token.cancel();

        let err = resolver
            .resolve()
            .address("123 Main St")
            .cancellation(&token)
            .call()
            .await
            .unwrap_err();

        assert!(matches!(err, DsirError::Cancelled));
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 0);
        assert!(resolver.history.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_backoff() {
        let resolver = resolver(FakeHistory::new(vec![dry_year(0), dry_year(365)]))
            .with_retry_backoff(std::time::Duration::from_secs(3600));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .cancellation(&token)
            .call()
            .await
            .unwrap_err();

        assert!(matches!(err, DsirError::Cancelled));
        assert_eq!(resolver.history.requests(), vec![today()]);
    }

    #[tokio::test]
    async fn test_transport_failure_stops_the_search() {
        // Year one only has an event-tagged day, which the fallback would pick.
        let history = FakeHistory::new(vec![
            export(&[day(20, "0.00", "Rain"), day(2, "0.00", "")]),
            dry_year(365),
            dry_year(730),
        ])
        .failing_on(1);
        let resolver = resolver(history);

        let err = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .call()
            .await
            .unwrap_err();

        assert!(matches!(err, DsirError::Transport(TransportError::NetworkRequest(..))));
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(resolver.history.requests(), vec![today(), days_before(365)]);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_pending_fetch() {
        let resolver = resolver(FakeHistory::new(vec![dry_year(0), dry_year(365)]).stalling_on(1));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = resolver
            .resolve()
            .address("123 Main St")
            .as_of(today())
            .cancellation(&token)
            .call()
            .await
            .unwrap_err();

        assert!(matches!(err, DsirError::Cancelled));
        assert_eq!(resolver.history.requests(), vec![today(), days_before(365)]);
    }
}
