//! Loop / wedge detector (spec §4.4.4): catches a brain repeatedly making
//! the identical choice on what the server keeps presenting as the same
//! decision, and breaks the loop before the worker spins forever.

use std::collections::VecDeque;
use swgemp_gameplay::DecisionType;

/// The key must include prompt text, not `decision_id` alone: the server
/// reuses ids across unrelated decisions (spec §4.4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
struct WedgeKey {
    decision_id: String,
    decision_type: Option<DecisionType>,
    prompt: String,
    chosen_option_id: String,
}

const WEDGE_THRESHOLD: usize = 3;
const HISTORY_CAPACITY: usize = WEDGE_THRESHOLD;

/// Tracks the last few decisions to detect three identical repeats in a
/// row. A single non-matching decision in between resets the streak.
#[derive(Debug, Default)]
pub struct WedgeDetector {
    recent: VecDeque<WedgeKey>,
}

impl WedgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a posted decision and reports whether the last
    /// [`WEDGE_THRESHOLD`] entries (including this one) are all identical.
    pub fn record(
        &mut self,
        decision_id: &str,
        decision_type: Option<DecisionType>,
        prompt: &str,
        chosen_option_id: &str,
    ) -> bool {
        let key = WedgeKey {
            decision_id: decision_id.to_string(),
            decision_type,
            prompt: prompt.to_string(),
            chosen_option_id: chosen_option_id.to_string(),
        };
        self.recent.push_back(key);
        while self.recent.len() > HISTORY_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.len() == HISTORY_CAPACITY && self.recent.iter().all(|k| k == self.recent.back().unwrap())
    }

    /// Clears the streak once a wedge has been broken, so the next repeat
    /// needs a fresh run of [`WEDGE_THRESHOLD`] before triggering again.
    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_identical_decisions_in_a_row_trigger_a_wedge() {
        let mut detector = WedgeDetector::new();
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
        assert!(detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
    }

    #[test]
    fn a_different_choice_in_between_resets_the_streak() {
        let mut detector = WedgeDetector::new();
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "1"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose", "0"));
    }

    #[test]
    fn reused_decision_id_with_different_prompt_does_not_count_as_repeat() {
        let mut detector = WedgeDetector::new();
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose A", "0"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose B", "0"));
        assert!(!detector.record("d1", Some(DecisionType::MultipleChoice), "Choose A", "0"));
    }

    #[test]
    fn explicit_reset_clears_the_streak() {
        let mut detector = WedgeDetector::new();
        detector.record("d1", None, "Choose", "0");
        detector.record("d1", None, "Choose", "0");
        detector.reset();
        assert!(!detector.record("d1", None, "Choose", "0"));
    }
}
