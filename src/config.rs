use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::anomaly::NominalBand;
use crate::feeds::SourceKind;
use crate::orbit::GroundStation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub http: HttpConfig,
    pub station: Option<StationConfig>,
    pub sources: SourcesConfig,
    pub anomaly: NominalBandConfig,
    pub alerts: AlertsConfig,
    pub favorites: FavoritesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    /// Front-end assets served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("space-radar/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl StationConfig {
    pub fn ground_station(&self) -> Option<GroundStation> {
        GroundStation::from_coordinates(&self.coordinates, Some(self.altitude_m))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

impl SourceConfig {
    fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            interval: default_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub catalog: SourceConfig,
    pub signals: SourceConfig,
    pub passes: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            catalog: SourceConfig::with_url(
                "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=json",
            ),
            signals: SourceConfig::with_url(
                "https://db.satnogs.org/api/signals/?status=UNIDENTIFIED&format=json",
            ),
            passes: SourceConfig::with_url(
                "https://api.heavens-above.com/VisiblePasses/?lat=0&lng=0&alt=0&tz=UTC",
            ),
        }
    }
}

impl SourcesConfig {
    pub fn get(&self, source: SourceKind) -> &SourceConfig {
        match source {
            SourceKind::Catalog => &self.catalog,
            SourceKind::Signals => &self.signals,
            SourceKind::Passes => &self.passes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NominalBandConfig {
    pub low_mhz: f64,
    pub high_mhz: f64,
}

impl Default for NominalBandConfig {
    fn default() -> Self {
        let band = NominalBand::default();
        Self {
            low_mhz: band.low_mhz,
            high_mhz: band.high_mhz,
        }
    }
}

impl NominalBandConfig {
    pub fn band(&self) -> NominalBand {
        NominalBand {
            low_mhz: self.low_mhz,
            high_mhz: self.high_mhz,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub notify_on_first_cycle: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            notify_on_first_cycle: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    pub folder: PathBuf,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./data"),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null; treat it as all defaults.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for source in SourceKind::ALL {
            let source_config = self.sources.get(source);
            if source_config.interval.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "sources.{}.interval must be positive",
                    source
                )));
            }
            if source_config.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("sources.{}.url is empty", source)));
            }
        }

        let band = &self.anomaly;
        if !band.low_mhz.is_finite() || !band.high_mhz.is_finite() || band.low_mhz > band.high_mhz
        {
            return Err(ConfigError::Invalid(format!(
                "anomaly band [{}, {}] is not a valid range",
                band.low_mhz, band.high_mhz
            )));
        }

        if let Some(station) = &self.station {
            if station.ground_station().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "station coordinates {:?} are not \"lat, lon\"",
                    station.coordinates
                )));
            }
        }

        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.sources.signals.interval, Duration::from_secs(60));
        assert!(config.sources.catalog.url.contains("celestrak"));
        assert_eq!(config.anomaly.band(), NominalBand::default());
        assert!(config.alerts.notify_on_first_cycle);
        assert!(config.station.is_none());
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
web:
  bind: 127.0.0.1:9000
  static_dir: ./public
http:
  timeout: 5s
station:
  name: Madrid
  coordinates: "40.4168, -3.7038"
  altitude_m: 650
sources:
  signals:
    url: http://localhost:1234/signals
    interval: 2m 30s
anomaly:
  low_mhz: 144
  high_mhz: 438
alerts:
  notify_on_first_cycle: false
favorites:
  folder: /var/lib/space-radar
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.sources.signals.interval, Duration::from_secs(150));
        assert_eq!(config.sources.catalog.interval, Duration::from_secs(60));
        assert_eq!(config.anomaly.band().low_mhz, 144.0);
        assert!(!config.alerts.notify_on_first_cycle);
        let station = config.station.unwrap().ground_station().unwrap();
        assert_eq!(station.altitude_m, 650.0);
    }

    #[test]
    fn rejects_inverted_band() {
        let err = Config::from_str("anomaly: { low_mhz: 1000, high_mhz: 100 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_interval() {
        let yaml = "sources:\n  passes:\n    url: http://x\n    interval: 0s\n";
        assert!(matches!(
            Config::from_str(yaml).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn rejects_bad_station() {
        let yaml = "station:\n  coordinates: somewhere\n";
        assert!(matches!(
            Config::from_str(yaml).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn example_config_is_valid() {
        let config = Config::from_str(include_str!("../config.example.yaml")).unwrap();
        assert_eq!(config.sources.catalog.interval, Duration::from_secs(600));
        assert!(config.station.is_some());
    }

    #[test]
    fn rejects_bad_duration() {
        let yaml = "http:\n  timeout: forever\n";
        assert!(matches!(Config::from_str(yaml).unwrap_err(), ConfigError::Yaml(_)));
    }
}
