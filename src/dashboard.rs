//! Single owner of the dashboard's readable state.
//!
//! Web handlers never touch the scheduler or the favorites store directly;
//! every read and write goes through [`Dashboard`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use utoipa::ToSchema;

use crate::alerts::Alert;
use crate::anomaly::{self, NominalBand};
use crate::config::Config;
use crate::favorites::{FavoritesError, FavoritesStore};
use crate::feeds::{CatalogFeed, JsonClient, PassFeed, SignalFeed, SourceKind};
use crate::model::{CatalogRecord, ObjectType, PassRecord, SignalRecord, TypeFilter};
use crate::orbit::{self, GeoPoint, GroundStation, LookAngles, OrbitError, TrackPoint};
use crate::refresh::{RefreshState, Scheduler, SourceHandle};
use crate::search;

pub const RETRY_LATER_MESSAGE: &str = "Data temporarily unavailable, please retry later";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

/// Handles of the three registered sources.
#[derive(Clone)]
pub struct Sources {
    pub catalog: SourceHandle<CatalogRecord>,
    pub signals: SourceHandle<SignalRecord>,
    pub passes: SourceHandle<PassRecord>,
}

impl Sources {
    pub fn register(scheduler: &mut Scheduler, config: &Config, http: reqwest::Client) -> Self {
        let client = |source: SourceKind| JsonClient::new(http.clone(), &config.sources.get(source).url);
        let every = |source: SourceKind| config.sources.get(source).interval;

        Self {
            catalog: scheduler.register(
                SourceKind::Catalog,
                CatalogFeed::new(client(SourceKind::Catalog)),
                every(SourceKind::Catalog),
            ),
            signals: scheduler.register(
                SourceKind::Signals,
                SignalFeed::new(client(SourceKind::Signals)),
                every(SourceKind::Signals),
            ),
            passes: scheduler.register(
                SourceKind::Passes,
                PassFeed::new(client(SourceKind::Passes)),
                every(SourceKind::Passes),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SourceStatus {
    pub source: SourceKind,
    /// No cycle has completed yet.
    pub loading: bool,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub count: usize,
}

impl SourceStatus {
    fn of<T>(source: SourceKind, state: &RefreshState<T>) -> Self {
        Self {
            source,
            loading: state.is_loading(),
            error: state.error,
            message: state.error.then(|| RETRY_LATER_MESSAGE.to_string()),
            last_updated: state.last_updated,
            count: state.records().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub name: String,
    pub catalog_id: String,
    pub object_type: ObjectType,
    pub mean_motion: f64,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub favorite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogView {
    pub status: SourceStatus,
    pub records: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ObjectPosition {
    pub name: String,
    pub catalog_id: String,
    pub favorite: bool,
    /// Sub-satellite point, for the globe.
    pub ground: Option<GeoPoint>,
    /// Look angles from the configured station, for the sky map.
    pub sky: Option<LookAngles>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PositionsView {
    pub status: SourceStatus,
    pub at: DateTime<Utc>,
    pub station: Option<GroundStation>,
    pub positions: Vec<ObjectPosition>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignalsView {
    pub status: SourceStatus,
    pub records: Vec<SignalRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnomaliesView {
    pub status: SourceStatus,
    pub band: NominalBand,
    pub records: Vec<SignalRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesView {
    pub status: SourceStatus,
    pub records: Vec<PassRecord>,
}

pub struct Dashboard {
    sources: Sources,
    favorites: Mutex<FavoritesStore>,
    band: NominalBand,
    station: Option<GroundStation>,
    alerts: broadcast::Sender<Alert>,
}

impl Dashboard {
    pub fn new(
        sources: Sources,
        favorites: FavoritesStore,
        band: NominalBand,
        station: Option<GroundStation>,
        alerts: broadcast::Sender<Alert>,
    ) -> Self {
        Self {
            sources,
            favorites: Mutex::new(favorites),
            band,
            station,
            alerts,
        }
    }

    pub fn status(&self, source: SourceKind) -> SourceStatus {
        match source {
            SourceKind::Catalog => SourceStatus::of(source, &self.sources.catalog.snapshot()),
            SourceKind::Signals => SourceStatus::of(source, &self.sources.signals.snapshot()),
            SourceKind::Passes => SourceStatus::of(source, &self.sources.passes.snapshot()),
        }
    }

    pub fn statuses(&self) -> Vec<SourceStatus> {
        SourceKind::ALL.into_iter().map(|s| self.status(s)).collect()
    }

    pub fn refresh(&self, source: SourceKind) {
        match source {
            SourceKind::Catalog => self.sources.catalog.refresh_now(),
            SourceKind::Signals => self.sources.signals.refresh_now(),
            SourceKind::Passes => self.sources.passes.refresh_now(),
        }
    }

    pub async fn catalog(&self, query: &str, type_filter: TypeFilter) -> CatalogView {
        let state = self.sources.catalog.snapshot();
        let favorites = self.favorites.lock().await;

        let records = search::filter(state.records(), query, type_filter)
            .into_iter()
            .map(|record| CatalogEntry {
                name: record.name.clone(),
                catalog_id: record.catalog_id.clone(),
                object_type: record.object_type,
                mean_motion: record.mean_motion,
                inclination_deg: record.inclination_deg,
                eccentricity: record.eccentricity,
                favorite: favorites.is_favorite(&record.name),
            })
            .collect();

        CatalogView {
            status: SourceStatus::of(SourceKind::Catalog, &state),
            records,
        }
    }

    pub async fn positions(
        &self,
        query: &str,
        type_filter: TypeFilter,
        at: DateTime<Utc>,
    ) -> PositionsView {
        let state = self.sources.catalog.snapshot();
        let favorites = self.favorites.lock().await;

        let positions = search::filter(state.records(), query, type_filter)
            .into_iter()
            .map(|record| {
                let (ground, sky) = match &record.orbit {
                    Some(orbit) => (
                        log_failure(&record.name, orbit::subpoint(orbit, at)),
                        self.station.as_ref().and_then(|station| {
                            log_failure(&record.name, orbit::look_angles(station, orbit, at))
                        }),
                    ),
                    None => (None, None),
                };
                ObjectPosition {
                    name: record.name.clone(),
                    catalog_id: record.catalog_id.clone(),
                    favorite: favorites.is_favorite(&record.name),
                    ground,
                    sky,
                }
            })
            .collect();

        PositionsView {
            status: SourceStatus::of(SourceKind::Catalog, &state),
            at,
            station: self.station,
            positions,
        }
    }

    /// Ground track of the first catalog object named `name`.
    pub fn track(
        &self,
        name: &str,
        start: DateTime<Utc>,
        span: Duration,
        step: Duration,
    ) -> Result<Vec<TrackPoint>, DashboardError> {
        let state = self.sources.catalog.snapshot();
        let record = state
            .records()
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DashboardError::NotFound(name.to_string()))?;
        let orbit = record
            .orbit
            .as_ref()
            .ok_or_else(|| OrbitError::Missing(name.to_string()))?;

        let end = start
            .checked_add_signed(span)
            .ok_or_else(|| OrbitError::Propagation("track end out of range".into()))?;
        Ok(orbit::ground_track(orbit, start, end, step)?)
    }

    pub fn signals(&self) -> SignalsView {
        let state = self.sources.signals.snapshot();
        SignalsView {
            status: SourceStatus::of(SourceKind::Signals, &state),
            records: state.records().to_vec(),
        }
    }

    pub fn anomalies(&self) -> AnomaliesView {
        let state = self.sources.signals.snapshot();
        AnomaliesView {
            status: SourceStatus::of(SourceKind::Signals, &state),
            band: self.band,
            records: anomaly::detect(state.records(), &self.band)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    pub fn passes(&self) -> PassesView {
        let state = self.sources.passes.snapshot();
        PassesView {
            status: SourceStatus::of(SourceKind::Passes, &state),
            records: state.records().to_vec(),
        }
    }

    pub async fn favorites(&self) -> Vec<String> {
        self.favorites.lock().await.names()
    }

    pub async fn toggle_favorite(&self, name: &str) -> Result<bool, DashboardError> {
        let mut favorites = self.favorites.lock().await;
        let favorite = favorites.toggle(name)?;
        log::info!(
            "{} {} favorites",
            name,
            if favorite { "added to" } else { "removed from" }
        );
        Ok(favorite)
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }
}

fn log_failure<T>(name: &str, result: Result<T, OrbitError>) -> Option<T> {
    result
        .map_err(|e| log::debug!("no position for {}: {}", name, e))
        .ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::favorites::MemoryStore;
    use crate::feeds::{Feed, FeedError};
    use crate::orbit::iss_orbit;
    use chrono::TimeZone;
    use std::sync::Arc;

    /// Returns the same records on every cycle.
    pub(crate) struct StaticFeed<T>(pub(crate) Vec<T>);

    impl<T: Clone + Send + Sync + 'static> Feed for StaticFeed<T> {
        type Record = T;

        async fn fetch(&self) -> Result<Vec<T>, FeedError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails with a network error.
    pub(crate) struct DownFeed<T>(std::marker::PhantomData<fn() -> T>);

    impl<T> DownFeed<T> {
        pub(crate) fn new() -> Self {
            Self(std::marker::PhantomData)
        }
    }

    impl<T: Send + Sync + 'static> Feed for DownFeed<T> {
        type Record = T;

        async fn fetch(&self) -> Result<Vec<T>, FeedError> {
            Err(FeedError::Network("connection refused".into()))
        }
    }

    pub(crate) fn catalog_record(name: &str, object_type: ObjectType) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            catalog_id: "25544".to_string(),
            object_type,
            mean_motion: 15.49,
            inclination_deg: 51.64,
            eccentricity: 0.0001,
            orbit: None,
        }
    }

    pub(crate) fn signal_record(id: &str, frequency_mhz: f64) -> SignalRecord {
        SignalRecord {
            id: id.to_string(),
            frequency_mhz,
            station_id: "1".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            duration_seconds: 30.0,
        }
    }

    /// Dashboard over static catalog and signals feeds and a failing passes feed.
    /// Resolves once every source has completed its first cycle.
    pub(crate) async fn test_dashboard(
        catalog: Vec<CatalogRecord>,
        signals: Vec<SignalRecord>,
        station: Option<GroundStation>,
    ) -> (Dashboard, Scheduler) {
        let mut scheduler = Scheduler::new();
        let every = std::time::Duration::from_secs(3600);
        let sources = Sources {
            catalog: scheduler.register(SourceKind::Catalog, StaticFeed(catalog), every),
            signals: scheduler.register(SourceKind::Signals, StaticFeed(signals), every),
            passes: scheduler.register(SourceKind::Passes, DownFeed::<PassRecord>::new(), every),
        };

        sources.catalog.subscribe().changed().await.unwrap();
        sources.signals.subscribe().changed().await.unwrap();
        sources.passes.subscribe().changed().await.unwrap();

        let favorites = FavoritesStore::empty(Box::new(MemoryStore::default()));
        let (alerts, _) = broadcast::channel(8);
        let dashboard = Dashboard::new(sources, favorites, NominalBand::default(), station, alerts);
        (dashboard, scheduler)
    }

    #[tokio::test]
    async fn catalog_view_filters_and_flags_favorites() {
        let (dashboard, mut scheduler) = test_dashboard(
            vec![
                catalog_record("ISS", ObjectType::Payload),
                catalog_record("DEBRIS-1", ObjectType::Debris),
            ],
            vec![],
            None,
        )
        .await;

        dashboard.toggle_favorite("ISS").await.unwrap();
        let view = dashboard.catalog("iss", TypeFilter::All).await;
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].name, "ISS");
        assert!(view.records[0].favorite);
        assert_eq!(view.status.count, 2);
        assert!(!view.status.loading);

        let debris = dashboard
            .catalog("", TypeFilter::Only(ObjectType::Debris))
            .await;
        assert_eq!(debris.records.len(), 1);
        assert!(!debris.records[0].favorite);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn failing_source_degrades_alone() {
        let (dashboard, mut scheduler) =
            test_dashboard(vec![], vec![signal_record("a", 50.0)], None).await;

        let passes = dashboard.status(SourceKind::Passes);
        assert!(passes.error);
        assert_eq!(passes.message.as_deref(), Some(RETRY_LATER_MESSAGE));

        let signals = dashboard.signals();
        assert!(!signals.status.error);
        assert!(signals.status.message.is_none());
        assert_eq!(signals.records.len(), 1);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn anomalies_use_configured_band() {
        let (dashboard, mut scheduler) = test_dashboard(
            vec![],
            vec![
                signal_record("a", 50.0),
                signal_record("ok", 437.0),
                signal_record("b", 2000.0),
            ],
            None,
        )
        .await;

        let ids: Vec<String> = dashboard
            .anomalies()
            .records
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["a", "b"]);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn positions_only_for_objects_with_orbits() {
        let mut iss = catalog_record("ISS", ObjectType::Payload);
        iss.orbit = Some(Arc::new(iss_orbit()));
        let station = GroundStation {
            latitude_deg: 40.4,
            longitude_deg: -3.7,
            altitude_m: 650.0,
        };
        let (dashboard, mut scheduler) = test_dashboard(
            vec![iss, catalog_record("DEBRIS-1", ObjectType::Debris)],
            vec![],
            Some(station),
        )
        .await;

        let at = Utc.with_ymd_and_hms(2020, 7, 12, 22, 0, 0).unwrap();
        let view = dashboard.positions("", TypeFilter::All, at).await;
        assert_eq!(view.positions.len(), 2);
        assert!(view.positions[0].ground.is_some());
        assert!(view.positions[0].sky.is_some());
        assert!(view.positions[1].ground.is_none());
        assert!(view.positions[1].sky.is_none());

        let track = dashboard
            .track("ISS", at, Duration::minutes(90), Duration::minutes(5))
            .unwrap();
        assert_eq!(track.len(), 19);
        assert!(matches!(
            dashboard.track("DEBRIS-1", at, Duration::minutes(90), Duration::minutes(5)),
            Err(DashboardError::Orbit(OrbitError::Missing(_)))
        ));
        assert!(matches!(
            dashboard.track("HST", at, Duration::minutes(90), Duration::minutes(5)),
            Err(DashboardError::NotFound(_))
        ));
        // A million years past 2020 is beyond the representable calendar.
        assert!(matches!(
            dashboard.track("ISS", at, Duration::days(365_000_000), Duration::minutes(5)),
            Err(DashboardError::Orbit(OrbitError::Propagation(_)))
        ));

        scheduler.stop().await;
    }
}
