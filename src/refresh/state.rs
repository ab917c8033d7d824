use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Latest known data and error status of one source.
#[derive(Debug, Clone)]
pub struct RefreshState<T> {
    /// Last successfully fetched records; kept when a later cycle fails.
    pub data: Option<Arc<Vec<T>>>,
    pub error: bool,
    pub last_error: Option<String>,
    /// Completion time of the last successful cycle.
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of successful cycles so far.
    pub generation: u64,
}

impl<T> Default for RefreshState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: false,
            last_error: None,
            last_updated: None,
            generation: 0,
        }
    }
}

impl<T> RefreshState<T> {
    pub fn records(&self) -> &[T] {
        self.data.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    /// No cycle has completed yet.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && !self.error
    }

    pub(crate) fn apply_success(&mut self, records: Vec<T>, at: DateTime<Utc>) {
        self.data = Some(Arc::new(records));
        self.error = false;
        self.last_error = None;
        self.last_updated = Some(at);
        self.generation += 1;
    }

    pub(crate) fn apply_failure(&mut self, message: String) {
        self.error = true;
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_last_good_data() {
        let mut state = RefreshState::default();
        assert!(state.is_loading());

        state.apply_success(vec![1, 2, 3], Utc::now());
        assert_eq!(state.records(), &[1, 2, 3]);
        assert_eq!(state.generation, 1);

        state.apply_failure("network error: refused".into());
        assert!(state.error);
        assert_eq!(state.records(), &[1, 2, 3]);
        assert_eq!(state.generation, 1);
        assert!(!state.is_loading());

        state.apply_success(vec![4], Utc::now());
        assert!(!state.error);
        assert!(state.last_error.is_none());
        assert_eq!(state.records(), &[4]);
        assert_eq!(state.generation, 2);
    }

    #[test]
    fn failure_before_any_data_is_not_loading() {
        let mut state: RefreshState<u8> = RefreshState::default();
        state.apply_failure("format error".into());
        assert!(!state.is_loading());
        assert!(state.records().is_empty());
    }
}
