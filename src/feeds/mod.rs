mod catalog;
mod error;
mod http;
mod passes;
mod signals;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use strum_macros::Display;
use utoipa::ToSchema;

pub use catalog::CatalogFeed;
pub use error::FeedError;
pub use http::{build_client, JsonClient};
pub use passes::PassFeed;
pub use signals::SignalFeed;

/// One upstream data source, normalized into typed records.
///
/// Implementations do not retry; a failed fetch is reported once and the
/// refresh scheduler decides what happens next.
pub trait Feed: Send + Sync + 'static {
    type Record: Send + Sync + 'static;

    fn fetch(&self) -> impl Future<Output = Result<Vec<Self::Record>, FeedError>> + Send;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    Catalog,
    Signals,
    Passes,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Catalog, SourceKind::Signals, SourceKind::Passes];
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(SourceKind::Catalog),
            "signals" => Ok(SourceKind::Signals),
            "passes" => Ok(SourceKind::Passes),
            other => Err(format!("unknown source: {other}")),
        }
    }
}
