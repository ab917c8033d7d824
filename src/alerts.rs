use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use crate::model::SignalRecord;
use crate::refresh::RefreshState;

/// Raised when a signals cycle contains ids absent from the previous cycle.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Alert {
    pub count: usize,
    pub new_ids: Vec<String>,
    pub raised_at: DateTime<Utc>,
}

/// Tracks signal ids across cycles.
#[derive(Debug)]
pub struct AlertNotifier {
    previous_ids: HashSet<String>,
    notify_on_first_cycle: bool,
    seen_first_cycle: bool,
}

impl AlertNotifier {
    /// With `notify_on_first_cycle` off, the first observed cycle only seeds
    /// the known ids.
    pub fn new(notify_on_first_cycle: bool) -> Self {
        Self {
            previous_ids: HashSet::new(),
            notify_on_first_cycle,
            seen_first_cycle: false,
        }
    }

    pub fn observe(&mut self, signals: &[SignalRecord]) -> Option<Alert> {
        let current: HashSet<String> = signals.iter().map(|s| s.id.clone()).collect();

        // Report in feed order, each id once.
        let mut reported = HashSet::new();
        let new_ids: Vec<String> = signals
            .iter()
            .map(|s| &s.id)
            .filter(|id| !self.previous_ids.contains(*id) && reported.insert(*id))
            .cloned()
            .collect();

        let first_cycle = !self.seen_first_cycle;
        self.seen_first_cycle = true;
        self.previous_ids = current;

        if new_ids.is_empty() || (first_cycle && !self.notify_on_first_cycle) {
            return None;
        }

        Some(Alert {
            count: new_ids.len(),
            new_ids,
            raised_at: Utc::now(),
        })
    }
}

/// Feeds every successful signals cycle to `notifier` and broadcasts alerts.
/// Ends when the signals source stops publishing.
pub fn spawn_alert_watcher(
    mut signals: watch::Receiver<RefreshState<SignalRecord>>,
    mut notifier: AlertNotifier,
    alerts: broadcast::Sender<Alert>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_generation = 0;
        loop {
            let snapshot = {
                let state = signals.borrow_and_update();
                (state.generation != last_generation)
                    .then(|| (state.generation, state.data.clone()))
            };

            if let Some((generation, data)) = snapshot {
                last_generation = generation;
                let records = data.as_deref().map(Vec::as_slice).unwrap_or(&[]);
                if let Some(alert) = notifier.observe(records) {
                    log::warn!("{} new signal(s) detected: {:?}", alert.count, alert.new_ids);
                    // No subscribers is fine.
                    let _ = alerts.send(alert);
                }
            }

            if signals.changed().await.is_err() {
                break;
            }
        }
        log::debug!("alert watcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(id: &str, frequency_mhz: f64) -> SignalRecord {
        SignalRecord {
            id: id.to_string(),
            frequency_mhz,
            station_id: "7".to_string(),
            start_time: Utc::now(),
            duration_seconds: 1.0,
        }
    }

    #[test]
    fn first_cycle_notifies_by_default() {
        let mut notifier = AlertNotifier::new(true);
        let alert = notifier.observe(&[signal("a", 50.0), signal("b", 60.0)]).unwrap();
        assert_eq!(alert.count, 2);
        assert_eq!(alert.new_ids, ["a", "b"]);
    }

    #[test]
    fn first_cycle_can_be_suppressed() {
        let mut notifier = AlertNotifier::new(false);
        assert!(notifier.observe(&[signal("a", 50.0)]).is_none());

        let alert = notifier.observe(&[signal("a", 50.0), signal("b", 2000.0)]).unwrap();
        assert_eq!(alert.count, 1);
        assert_eq!(alert.new_ids, ["b"]);
    }

    #[test]
    fn empty_first_cycle_still_counts_as_first() {
        let mut notifier = AlertNotifier::new(false);
        assert!(notifier.observe(&[]).is_none());
        assert_eq!(notifier.observe(&[signal("a", 1.0)]).unwrap().count, 1);
    }

    #[test]
    fn count_matches_set_difference_each_cycle() {
        let mut notifier = AlertNotifier::new(true);
        let cycles: Vec<Vec<SignalRecord>> = vec![
            vec![signal("a", 1.0)],
            vec![signal("a", 1.0), signal("b", 1.0), signal("c", 1.0)],
            vec![signal("c", 1.0)],
            vec![signal("a", 1.0), signal("c", 1.0), signal("c", 1.0)],
            vec![],
            vec![signal("c", 1.0)],
        ];
        let expected = [Some(1), Some(2), None, Some(1), None, Some(1)];

        for (cycle, want) in cycles.iter().zip(expected) {
            assert_eq!(notifier.observe(cycle).map(|a| a.count), want);
        }
    }

    #[test]
    fn repeated_cycle_is_silent() {
        let mut notifier = AlertNotifier::new(true);
        let cycle = vec![signal("a", 1.0), signal("b", 1.0)];
        assert!(notifier.observe(&cycle).is_some());
        assert!(notifier.observe(&cycle).is_none());
    }

    #[tokio::test]
    async fn watcher_alerts_once_per_new_generation() {
        let (state_tx, state_rx) = watch::channel(RefreshState::<SignalRecord>::default());
        let (alerts_tx, mut alerts_rx) = broadcast::channel(8);
        let watcher = spawn_alert_watcher(state_rx, AlertNotifier::new(true), alerts_tx);

        state_tx.send_modify(|s| s.apply_success(vec![signal("a", 50.0)], Utc::now()));
        assert_eq!(alerts_rx.recv().await.unwrap().new_ids, ["a"]);

        // An error-only change is not a new cycle.
        state_tx.send_modify(|s| s.apply_failure("network error".into()));

        state_tx.send_modify(|s| {
            s.apply_success(vec![signal("a", 50.0), signal("b", 2000.0)], Utc::now())
        });
        let alert = alerts_rx.recv().await.unwrap();
        assert_eq!(alert.count, 1);
        assert_eq!(alert.new_ids, ["b"]);

        drop(state_tx);
        watcher.await.unwrap();
        assert!(alerts_rx.try_recv().is_err());
    }
}
