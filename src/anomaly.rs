use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::SignalRecord;

/// Frequency range, in MHz, considered normal. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NominalBand {
    pub low_mhz: f64,
    pub high_mhz: f64,
}

impl Default for NominalBand {
    fn default() -> Self {
        Self {
            low_mhz: 100.0,
            high_mhz: 1000.0,
        }
    }
}

impl NominalBand {
    pub fn contains(&self, frequency_mhz: f64) -> bool {
        !(frequency_mhz < self.low_mhz || frequency_mhz > self.high_mhz)
    }
}

/// Signals whose frequency lies outside `band`, in input order.
pub fn detect<'a>(signals: &'a [SignalRecord], band: &NominalBand) -> Vec<&'a SignalRecord> {
    signals
        .iter()
        .filter(|signal| !band.contains(signal.frequency_mhz))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn signal(id: &str, frequency_mhz: f64) -> SignalRecord {
        SignalRecord {
            id: id.to_string(),
            frequency_mhz,
            station_id: "1".to_string(),
            start_time: Utc::now(),
            duration_seconds: 10.0,
        }
    }

    fn ids(found: &[&SignalRecord]) -> Vec<String> {
        found.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(detect(&[], &NominalBand::default()).is_empty());
    }

    #[test]
    fn in_band_signals_are_not_anomalies() {
        let signals = vec![signal("a", 100.0), signal("b", 437.5), signal("c", 1000.0)];
        assert!(detect(&signals, &NominalBand::default()).is_empty());
    }

    #[test]
    fn keeps_out_of_band_signals_in_order() {
        let signals = vec![
            signal("low", 50.0),
            signal("ok", 145.8),
            signal("high", 2000.0),
            signal("edge", 99.999),
        ];
        let found = detect(&signals, &NominalBand::default());
        assert_eq!(ids(&found), ["low", "high", "edge"]);
        assert!(found
            .iter()
            .all(|s| s.frequency_mhz < 100.0 || s.frequency_mhz > 1000.0));
    }

    #[test]
    fn respects_custom_band() {
        let band = NominalBand {
            low_mhz: 400.0,
            high_mhz: 450.0,
        };
        let signals = vec![signal("a", 145.8), signal("b", 437.5)];
        assert_eq!(ids(&detect(&signals, &band)), ["a"]);
    }

    #[test]
    fn second_cycle_of_feed_scenario() {
        let cycle2 = vec![signal("a", 50.0), signal("b", 2000.0)];
        assert_eq!(ids(&detect(&cycle2, &NominalBand::default())), ["a", "b"]);
    }
}
