//! The inputs and outputs of a single brain invocation (spec §4.4.1–4.4.2).

use std::collections::VecDeque;
use swgemp_core::{BlueprintId, CardId, DecisionId, LocationIndex};
use swgemp_gameplay::{BoardState, DecisionEvent, DecisionType};

/// A decision option enriched with its resolved `CardInPlay`/location
/// reference and selectability, ready for evaluator scoring (spec §4.4.1
/// points 1–2).
#[derive(Debug, Clone)]
pub struct DecisionOption {
    pub option_id: String,
    pub display_text: String,
    pub card_id: Option<CardId>,
    pub target_location: Option<LocationIndex>,
    pub selectable: bool,
}

/// A fully parsed decision, the unit C5 hands to the brain (spec §4.4.1).
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub decision_id: DecisionId,
    pub decision_type: Option<DecisionType>,
    pub raw_decision_type: String,
    pub prompt: String,
    pub no_pass: bool,
    pub default_value: Option<String>,
    pub options: Vec<DecisionOption>,
}

impl DecisionRequest {
    /// Parses a wire [`DecisionEvent`] into a request, resolving the
    /// parallel `selectable` bitmap (options with no entry default to
    /// selectable) and dropping non-selectable options from scoring
    /// consideration while keeping them in `options` for safety-override
    /// bookkeeping (spec §4.4.1 point 2).
    pub fn from_event(event: &DecisionEvent) -> Self {
        let options = event
            .options
            .iter()
            .enumerate()
            .map(|(i, raw)| DecisionOption {
                option_id: raw.option_id.clone(),
                display_text: raw.display_text.clone(),
                card_id: raw.card_id.clone(),
                target_location: raw.target_location,
                selectable: event
                    .selectable
                    .as_ref()
                    .and_then(|bits| bits.get(i))
                    .copied()
                    .unwrap_or(true),
            })
            .collect();
        Self {
            decision_id: event.decision_id.clone(),
            decision_type: event.decision_type,
            raw_decision_type: event.raw_decision_type.clone(),
            prompt: event.prompt.clone(),
            no_pass: event.no_pass,
            default_value: event.default_value.clone(),
            options,
        }
    }

    pub fn selectable_options(&self) -> impl Iterator<Item = &DecisionOption> {
        self.options.iter().filter(|o| o.selectable)
    }

    pub fn option(&self, option_id: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.option_id == option_id)
    }

    /// Best-effort "this looks like a cancel/pass option" check, driven by
    /// display text since the wire format has no dedicated flag (spec
    /// §4.4.3 "Cancel-when-required").
    pub fn is_cancel_option(&self, option_id: &str) -> bool {
        self.option(option_id)
            .map(|o| {
                let lower = o.display_text.to_ascii_lowercase();
                lower.contains("cancel") || lower.contains("pass")
            })
            .unwrap_or(false)
    }

    pub fn first_non_cancel_option(&self) -> Option<&DecisionOption> {
        self.selectable_options().find(|o| !self.is_cancel_option(&o.option_id))
    }
}

/// One recorded opponent deployment, kept for brain heuristics (spec §3
/// "game history and per-opponent observations").
#[derive(Debug, Clone)]
pub struct OpponentDeploy {
    pub blueprint_id: BlueprintId,
    pub turn_number: u32,
}

/// Running counters the core keeps across a game, not persisted beyond it
/// (spec §6.3 scopes persistence to game start/end only).
#[derive(Debug, Clone, Default)]
pub struct GameHistory {
    pub decisions_seen: std::collections::HashMap<String, u32>,
    pub opponent_deploys: VecDeque<OpponentDeploy>,
    pub turn_count: u32,
}

const MAX_OPPONENT_DEPLOYS_REMEMBERED: usize = 16;

impl GameHistory {
    pub fn record_decision(&mut self, raw_decision_type: &str) {
        *self.decisions_seen.entry(raw_decision_type.to_string()).or_insert(0) += 1;
    }

    pub fn record_opponent_deploy(&mut self, blueprint_id: BlueprintId, turn_number: u32) {
        self.opponent_deploys.push_back(OpponentDeploy { blueprint_id, turn_number });
        while self.opponent_deploys.len() > MAX_OPPONENT_DEPLOYS_REMEMBERED {
            self.opponent_deploys.pop_front();
        }
    }
}

/// Read-only bundle a brain sees: board state plus running history for the
/// decision at hand (spec §4.4.1 point 3).
pub struct BrainContext<'a> {
    pub board: &'a BoardState,
    pub history: &'a GameHistory,
    pub request: &'a DecisionRequest,
}

/// What a brain hands back to C5 before safety overrides are applied
/// (spec §4.4.2).
#[derive(Debug, Clone, Default)]
pub struct BrainDecision {
    pub choice: String,
    pub reasoning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use swgemp_gameplay::RawDecisionOption;

    fn raw_event() -> DecisionEvent {
        DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: Some(DecisionType::MultipleChoice),
            raw_decision_type: "MULTIPLE_CHOICE".to_string(),
            prompt: "Choose".to_string(),
            no_pass: true,
            default_value: None,
            options: vec![
                RawDecisionOption {
                    option_id: "0".to_string(),
                    display_text: "Deploy Luke".to_string(),
                    card_id: Some("c1".to_string()),
                    target_location: None,
                },
                RawDecisionOption {
                    option_id: "1".to_string(),
                    display_text: "Cancel".to_string(),
                    card_id: None,
                    target_location: None,
                },
            ],
            selectable: Some(vec![true, false]),
        }
    }

    #[test]
    fn selectable_bitmap_filters_options() {
        let request = DecisionRequest::from_event(&raw_event());
        let selectable: Vec<_> = request.selectable_options().map(|o| o.option_id.clone()).collect();
        assert_eq!(selectable, vec!["0".to_string()]);
    }

    #[test]
    fn missing_bitmap_defaults_every_option_selectable() {
        let mut event = raw_event();
        event.selectable = None;
        let request = DecisionRequest::from_event(&event);
        assert_eq!(request.selectable_options().count(), 2);
    }

    #[test]
    fn cancel_option_detected_by_display_text() {
        let request = DecisionRequest::from_event(&raw_event());
        assert!(request.is_cancel_option("1"));
        assert!(!request.is_cancel_option("0"));
    }

    #[test]
    fn opponent_deploy_history_caps_at_max_remembered() {
        let mut history = GameHistory::default();
        for i in 0..20 {
            history.record_opponent_deploy(format!("1_{i}"), i as u32);
        }
        assert_eq!(history.opponent_deploys.len(), MAX_OPPONENT_DEPLOYS_REMEMBERED);
        assert_eq!(history.opponent_deploys.front().unwrap().blueprint_id, "1_4");
    }
}
