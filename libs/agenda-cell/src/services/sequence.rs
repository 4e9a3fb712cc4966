//! Per-view request generation counters.
//!
//! Every reload bumps the counter for its view and captures the returned
//! token; when the fetch completes, the response is applied only if the
//! captured token still equals the current value. Latest-issued wins,
//! independent of completion order. There is no cancellation of the
//! in-flight request, only suppression of its effect.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::ViewKey;

#[derive(Default)]
pub struct RequestSequencer {
    counters: Mutex<HashMap<ViewKey, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation for `view` and return its token.
    pub fn bump(&self, view: ViewKey) -> u64 {
        let mut counters = self.counters.lock().unwrap();
        let counter = counters.entry(view).or_insert(0);
        *counter += 1;
        *counter
    }

    /// The latest issued token for `view` (0 before the first bump).
    pub fn current(&self, view: ViewKey) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(&view)
            .copied()
            .unwrap_or(0)
    }

    /// Strict equality between a captured token and the current one.
    pub fn is_current(&self, view: ViewKey, token: u64) -> bool {
        self.current(view) == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_monotonically_per_view() {
        let sequencer = RequestSequencer::new();

        assert_eq!(sequencer.bump(ViewKey::Day), 1);
        assert_eq!(sequencer.bump(ViewKey::Day), 2);
        assert_eq!(sequencer.bump(ViewKey::Week), 1);
        assert_eq!(sequencer.current(ViewKey::Day), 2);
    }

    #[test]
    fn only_the_latest_token_is_current() {
        let sequencer = RequestSequencer::new();

        let first = sequencer.bump(ViewKey::Day);
        let second = sequencer.bump(ViewKey::Day);

        assert!(!sequencer.is_current(ViewKey::Day, first));
        assert!(sequencer.is_current(ViewKey::Day, second));
    }

    #[test]
    fn views_are_tracked_independently() {
        let sequencer = RequestSequencer::new();

        let day = sequencer.bump(ViewKey::Day);
        sequencer.bump(ViewKey::Week);

        assert!(sequencer.is_current(ViewKey::Day, day));
    }
}
