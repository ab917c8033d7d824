use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::favorites::{FavoritesResponse, ToggleResponse};
use crate::alerts::Alert;
use crate::anomaly::NominalBand;
use crate::dashboard::{
    AnomaliesView, CatalogEntry, CatalogView, ObjectPosition, PassesView, PositionsView,
    SignalsView, SourceStatus,
};
use crate::feeds::SourceKind;
use crate::model::{ObjectType, PassRecord, SignalRecord};
use crate::orbit::{GeoPoint, GroundStation, LookAngles, TrackPoint};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::sources::status,
        super::api::sources::catalog,
        super::api::sources::positions,
        super::api::sources::track,
        super::api::sources::signals,
        super::api::sources::anomalies,
        super::api::sources::passes,
        super::api::sources::refresh,
        super::api::favorites::list_favorites,
        super::api::favorites::toggle_favorite,
        super::api::alerts::stream,
        super::api::proxy::satnogs,
    ),
    components(
        schemas(
            SourceKind,
            SourceStatus,
            ObjectType,
            CatalogEntry,
            CatalogView,
            ObjectPosition,
            PositionsView,
            GeoPoint,
            LookAngles,
            GroundStation,
            TrackPoint,
            SignalRecord,
            SignalsView,
            NominalBand,
            AnomaliesView,
            PassRecord,
            PassesView,
            Alert,
            FavoritesResponse,
            ToggleResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "Space Radar API",
        description = "Satellite catalog, radio signal and visible pass feeds",
        version = "0.1.0"
    ),
    tags(
        (name = "sources", description = "Refreshed upstream data"),
        (name = "favorites", description = "Favorite catalog objects"),
        (name = "alerts", description = "Anomaly alerts"),
        (name = "proxy", description = "Pass-through to the signals upstream")
    )
)]
pub struct ApiDoc;
