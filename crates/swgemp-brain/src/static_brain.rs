//! Reference brain: a deterministic, dependency-free fallback personality
//! (the default named by `brain_name = "Static"`, spec §6.2). Always
//! prefers the first non-cancel selectable option, falling back to
//! "pass if allowed else first option" exactly like the brain-exception
//! recovery path (spec §7), so a misconfigured or missing custom brain
//! still produces a legal, terminating game.

use crate::brain::Brain;
use crate::context::{BrainContext, BrainDecision};

pub struct StaticBrain {
    name: String,
}

impl StaticBrain {
    pub fn new() -> Self {
        Self { name: "Static".to_string() }
    }
}

impl Default for StaticBrain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Brain for StaticBrain {
    async fn make_decision(&mut self, context: &BrainContext<'_>) -> BrainDecision {
        let choice = context
            .request
            .first_non_cancel_option()
            .or_else(|| context.request.selectable_options().next())
            .map(|o| o.option_id.clone())
            .unwrap_or_default();
        BrainDecision { choice, reasoning: Some("static brain: first non-cancel option".to_string()) }
    }

    fn get_personality_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecisionRequest, GameHistory};
    use swgemp_gameplay::{BoardState, DecisionEvent, RawDecisionOption};

    #[tokio::test]
    async fn prefers_first_non_cancel_option() {
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "MULTIPLE_CHOICE".to_string(),
            prompt: "Choose".to_string(),
            no_pass: false,
            default_value: None,
            options: vec![
                RawDecisionOption {
                    option_id: "0".to_string(),
                    display_text: "Pass".to_string(),
                    card_id: None,
                    target_location: None,
                },
                RawDecisionOption {
                    option_id: "1".to_string(),
                    display_text: "Deploy Luke".to_string(),
                    card_id: None,
                    target_location: None,
                },
            ],
            selectable: None,
        };
        let request = DecisionRequest::from_event(&event);
        let board = BoardState::default();
        let history = GameHistory::default();
        let ctx = BrainContext { board: &board, history: &history, request: &request };
        let mut brain = StaticBrain::new();
        let decision = brain.make_decision(&ctx).await;
        assert_eq!(decision.choice, "1");
    }
}
