//! Concrete evaluators backing the reference brain's deploy decisions
//! (spec §4.4.5, §4.4.6). These are the "implementation choice" rule
//! weights the framework itself stays agnostic to; the framework only
//! mandates the scoring bands, ordering, and reasoning discipline this
//! module follows.

use crate::context::{BrainContext, DecisionOption};
use crate::evaluator::{EvaluatedAction, Evaluator};
use swgemp_cards::Card;

/// Scores a candidate deploy target against one card's "Deploys only on
/// X" restriction (spec §4.4.5, seed scenario S5): a location whose
/// system is not in the allowed set scores `<= 0` (illegal), one that is
/// scores in the moderate band.
pub struct DeployRestrictionEvaluator<'a> {
    pub card: &'a Card,
}

impl<'a> Evaluator for DeployRestrictionEvaluator<'a> {
    fn name(&self) -> &str {
        "deploy-restriction"
    }

    fn can_evaluate(&self, option: &DecisionOption, _ctx: &BrainContext<'_>) -> bool {
        option.target_location.is_some() && !self.card.allowed_systems().is_empty()
    }

    fn evaluate(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> EvaluatedAction {
        let index = option.target_location.expect("can_evaluate checked target_location");
        let system = ctx.board.location(index).map(|l| l.system_name.as_str()).unwrap_or("");
        let allowed = self.card.allowed_systems().iter().any(|s| s.eq_ignore_ascii_case(system));
        let (score, note) = if allowed {
            (35.0, format!("{system} is an allowed deploy system"))
        } else {
            (-50.0, format!("{system} is not in {}'s deploy restriction", self.card.title))
        };
        EvaluatedAction { option_id: option.option_id.clone(), score, reasoning: vec![format!("deploy-restriction: {note}")] }
    }
}

/// Boosts the option that lets a planned pilot board the ship it is meant
/// to fly, once the event processor has bound that ship's `card_id` (spec
/// §4.4.5 "deferred binding", seed scenario S6). Falls back to scoring the
/// ship's system location moderately so the pilot still has a legal target
/// before the ship's `PUT_CARD_IN_PLAY` arrives.
pub struct ShipBoardEvaluator<'a> {
    pub bound_ship_card_id: Option<&'a str>,
    pub fallback_system: Option<&'a str>,
}

/// Bonus applied when the offered option matches the bound ship's
/// `card_id`, kept well clear of every other evaluator's range so the
/// match always wins outright (spec §8 property 8 / seed S6: "+150 bonus
/// relative to the fallback").
const SHIP_MATCH_BONUS: f64 = 200.0;
const SHIP_FALLBACK_SCORE: f64 = 40.0;

impl<'a> Evaluator for ShipBoardEvaluator<'a> {
    fn name(&self) -> &str {
        "ship-board"
    }

    fn can_evaluate(&self, option: &DecisionOption, _ctx: &BrainContext<'_>) -> bool {
        (self.bound_ship_card_id.is_some() && option.card_id.is_some())
            || (self.fallback_system.is_some() && option.target_location.is_some())
    }

    fn evaluate(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> EvaluatedAction {
        if let (Some(bound), Some(card_id)) = (self.bound_ship_card_id, option.card_id.as_deref()) {
            if bound == card_id {
                return EvaluatedAction {
                    option_id: option.option_id.clone(),
                    score: SHIP_MATCH_BONUS,
                    reasoning: vec!["ship-board: boards the deployed ship directly".to_string()],
                };
            }
        }
        if let (Some(system), Some(index)) = (self.fallback_system, option.target_location) {
            let at_system = ctx.board.location(index).map(|l| l.system_name.as_str()) == Some(system);
            if at_system {
                return EvaluatedAction {
                    option_id: option.option_id.clone(),
                    score: SHIP_FALLBACK_SCORE,
                    reasoning: vec![format!("ship-board: falls back to {system}, ship not yet in play")],
                };
            }
        }
        EvaluatedAction { option_id: option.option_id.clone(), score: 0.0, reasoning: Vec::new() }
    }
}

/// Ensures the pass/cancel option always receives a score when the
/// decision permits passing (spec §4.4.6 "mandatory pass-option scoring
/// when `no_pass = false`"), so a brain comparing raw scores never treats
/// an un-scored pass as though it were illegal.
pub struct PassOptionEvaluator;

const PASS_SCORE: f64 = 10.0;

impl Evaluator for PassOptionEvaluator {
    fn name(&self) -> &str {
        "pass-option"
    }

    fn can_evaluate(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> bool {
        !ctx.request.no_pass && ctx.request.is_cancel_option(&option.option_id)
    }

    fn evaluate(&self, option: &DecisionOption, _ctx: &BrainContext<'_>) -> EvaluatedAction {
        EvaluatedAction {
            option_id: option.option_id.clone(),
            score: PASS_SCORE,
            reasoning: vec!["pass-option: always has a low-priority legal default".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecisionRequest, GameHistory};
    use crate::evaluator::CombinedEvaluator;
    use std::collections::HashSet;
    use swgemp_cards::CardType;
    use swgemp_core::Side;
    use swgemp_gameplay::{BoardState, DecisionEvent, RawDecisionOption};

    fn restricted_card() -> Card {
        Card {
            blueprint_id: "1_77".to_string(),
            title: "Moisture Farmer".to_string(),
            side: Side::Light,
            card_type: CardType::Character,
            sub_type: None,
            power: Some(1),
            ability: Some(1),
            deploy: Some(1),
            forfeit: Some(1),
            destiny: Some(1),
            icons: HashSet::new(),
            characteristics: HashSet::new(),
            gametext: "Deploys only on Tatooine.".to_string(),
            is_unique: false,
            is_defensive_shield: false,
            deploy_restrictions: ["Tatooine".to_string()].into_iter().collect(),
        }
    }

    fn board_with_two_coruscant_sites_and_tatooine() -> BoardState {
        let mut board = BoardState::default();
        board.ensure_location(0).resolve("Coruscant: Imperial City", true, false, true);
        board.ensure_location(1).resolve("Coruscant: Monument Plaza", true, false, true);
        board.ensure_location(2).resolve("Tatooine: Mos Eisley", true, false, true);
        board
    }

    fn deploy_request(options: Vec<(&str, usize)>) -> DecisionRequest {
        let raw = options
            .into_iter()
            .map(|(id, index)| RawDecisionOption {
                option_id: id.to_string(),
                display_text: format!("Deploy to location {index}"),
                card_id: None,
                target_location: Some(index),
            })
            .collect();
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "ACTION_CHOICE".to_string(),
            prompt: "Choose a location".to_string(),
            no_pass: false,
            default_value: None,
            options: raw,
            selectable: None,
        };
        DecisionRequest::from_event(&event)
    }

    /// Seed scenario S5: restricted deploy only scores the matching system.
    #[test]
    fn restricted_card_only_scores_the_allowed_system_positively() {
        let card = restricted_card();
        let board = board_with_two_coruscant_sites_and_tatooine();
        let history = GameHistory::default();
        let request = deploy_request(vec![("0", 0), ("1", 1), ("2", 2)]);
        let ctx = BrainContext { board: &board, history: &history, request: &request };
        let combined = CombinedEvaluator::new(vec![Box::new(DeployRestrictionEvaluator { card: &card })]);
        let ranked = combined.evaluate_all(&ctx);
        let tatooine = ranked.iter().find(|a| a.option_id == "2").unwrap();
        let coruscant_a = ranked.iter().find(|a| a.option_id == "0").unwrap();
        let coruscant_b = ranked.iter().find(|a| a.option_id == "1").unwrap();
        assert!(tatooine.score > 0.0);
        assert!(coruscant_a.score <= 0.0);
        assert!(coruscant_b.score <= 0.0);
        assert!(tatooine.score > coruscant_a.score);
    }

    /// Seed scenario S6: boarding the now-bound ship beats the system
    /// fallback, which in turn beats an unrelated option.
    #[test]
    fn ship_board_match_outranks_system_fallback() {
        let board = board_with_two_coruscant_sites_and_tatooine();
        let history = GameHistory::default();
        let raw = vec![
            RawDecisionOption {
                option_id: "board".to_string(),
                display_text: "Board the Falcon".to_string(),
                card_id: Some("331".to_string()),
                target_location: None,
            },
            RawDecisionOption {
                option_id: "system".to_string(),
                display_text: "Deploy to Tatooine".to_string(),
                card_id: None,
                target_location: Some(2),
            },
            RawDecisionOption {
                option_id: "elsewhere".to_string(),
                display_text: "Deploy to Coruscant".to_string(),
                card_id: None,
                target_location: Some(0),
            },
        ];
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "ACTION_CHOICE".to_string(),
            prompt: "Choose a destination".to_string(),
            no_pass: false,
            default_value: None,
            options: raw,
            selectable: None,
        };
        let request = DecisionRequest::from_event(&event);
        let ctx = BrainContext { board: &board, history: &history, request: &request };
        let combined = CombinedEvaluator::new(vec![Box::new(ShipBoardEvaluator {
            bound_ship_card_id: Some("331"),
            fallback_system: Some("Tatooine"),
        })]);
        let ranked = combined.evaluate_all(&ctx);
        let board_score = ranked.iter().find(|a| a.option_id == "board").unwrap().score;
        let system_score = ranked.iter().find(|a| a.option_id == "system").unwrap().score;
        let elsewhere_score = ranked.iter().find(|a| a.option_id == "elsewhere").unwrap().score;
        assert!(board_score > system_score);
        assert!(board_score - system_score >= 150.0);
        assert!(system_score > elsewhere_score);
    }

    #[test]
    fn pass_option_scores_only_when_passing_is_allowed() {
        let board = BoardState::default();
        let history = GameHistory::default();
        let raw = vec![RawDecisionOption {
            option_id: "0".to_string(),
            display_text: "Pass".to_string(),
            card_id: None,
            target_location: None,
        }];
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "ACTION_CHOICE".to_string(),
            prompt: "Choose".to_string(),
            no_pass: false,
            default_value: None,
            options: raw.clone(),
            selectable: None,
        };
        let request = DecisionRequest::from_event(&event);
        let ctx = BrainContext { board: &board, history: &history, request: &request };
        let combined = CombinedEvaluator::new(vec![Box::new(PassOptionEvaluator)]);
        let ranked = combined.evaluate_all(&ctx);
        assert_eq!(ranked[0].score, PASS_SCORE);

        let mut no_pass_event = event;
        no_pass_event.no_pass = true;
        let no_pass_request = DecisionRequest::from_event(&no_pass_event);
        let ctx2 = BrainContext { board: &board, history: &history, request: &no_pass_request };
        let ranked2 = combined.evaluate_all(&ctx2);
        assert_eq!(ranked2[0].score, 0.0);
    }
}
