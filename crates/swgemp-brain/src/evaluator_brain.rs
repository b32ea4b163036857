//! The reference brain (spec §4.4.5–§4.4.6): an evaluator-pipeline
//! personality built from the Deploy Planner and a handful of concrete
//! [`Evaluator`]s. The spec defines this brain's *structural* behavior —
//! plan, score, pick highest, pass when nothing scores legally — not the
//! detailed card-class scoring rules, which stay implementation choices
//! (spec §1 Non-goals).

use crate::brain::Brain;
use crate::context::{BrainContext, BrainDecision};
use crate::deploy_evaluators::{DeployRestrictionEvaluator, PassOptionEvaluator, ShipBoardEvaluator};
use crate::deploy_planner::DeployPlanner;
use crate::evaluator::{CombinedEvaluator, Evaluator, EvaluatedAction};
use std::collections::HashSet;
use swgemp_cards::{CardRegistry, CardType};
use swgemp_core::BlueprintId;
use swgemp_gameplay::DeploymentPlanObserver;

pub struct EvaluatorBrain {
    registry: &'static CardRegistry,
    planner: DeployPlanner,
}

impl EvaluatorBrain {
    pub fn new(registry: &'static CardRegistry) -> Self {
        Self { registry, planner: DeployPlanner::new() }
    }

    /// Starts a deployment plan on the first `ACTION_CHOICE` of a Deploy
    /// phase (spec §4.4.5), pairing each pilot in hand with the first
    /// unclaimed ship/vehicle in hand that doesn't already fly itself.
    fn maybe_build_plan(&mut self, ctx: &BrainContext<'_>) {
        if !self.planner.is_empty() {
            return;
        }
        if !ctx.request.raw_decision_type.eq_ignore_ascii_case("ACTION_CHOICE") {
            return;
        }
        if !ctx.board.current_phase.to_ascii_lowercase().contains("deploy") {
            return;
        }
        let candidates: Vec<BlueprintId> = ctx
            .board
            .my_zones
            .hand
            .iter()
            .filter_map(|id| ctx.board.card(id))
            .map(|c| c.blueprint_id.clone())
            .collect();
        if candidates.is_empty() {
            return;
        }

        let mut pilot_boards = Vec::new();
        let mut used_ships: HashSet<BlueprintId> = HashSet::new();
        for pilot_bp in &candidates {
            let Some(pilot_card) = self.registry.get(pilot_bp) else { continue };
            if !pilot_card.is_pilot() {
                continue;
            }
            let ship_bp = candidates.iter().find(|other| {
                *other != pilot_bp
                    && !used_ships.contains(other.as_str())
                    && self
                        .registry
                        .get(other)
                        .map(|c| matches!(c.card_type, CardType::Starship | CardType::Vehicle) && !c.has_permanent_pilot())
                        .unwrap_or(false)
            });
            if let Some(ship_bp) = ship_bp {
                used_ships.insert(ship_bp.clone());
                pilot_boards.push((pilot_bp.clone(), ship_bp.clone()));
            }
        }
        self.planner.plan(self.registry, &candidates, &pilot_boards);
    }

    /// Scores every selectable option with whichever evaluators apply to
    /// the instruction currently at the head of the plan, plus the
    /// always-present pass-option evaluator (spec §4.4.6).
    fn score_options(&self, ctx: &BrainContext<'_>) -> Vec<EvaluatedAction> {
        let mut evaluators: Vec<Box<dyn Evaluator + '_>> = vec![Box::new(PassOptionEvaluator)];
        if let Some(instruction) = self.planner.next_ready() {
            if let Some(card) = self.registry.get(&instruction.blueprint_id) {
                evaluators.push(Box::new(DeployRestrictionEvaluator { card }));
            }
            if instruction.aboard_ship_card_id.is_some() || instruction.target_system.is_some() {
                evaluators.push(Box::new(ShipBoardEvaluator {
                    bound_ship_card_id: instruction.aboard_ship_card_id.as_deref(),
                    fallback_system: instruction.target_system.as_deref(),
                }));
            }
        }
        CombinedEvaluator::new(evaluators).evaluate_all(ctx)
    }
}

#[async_trait::async_trait]
impl Brain for EvaluatorBrain {
    async fn make_decision(&mut self, context: &BrainContext<'_>) -> BrainDecision {
        self.maybe_build_plan(context);
        let ranked = self.score_options(context);

        let Some(best) = ranked.first() else {
            let choice = context.request.first_non_cancel_option().map(|o| o.option_id.clone()).unwrap_or_default();
            return BrainDecision { choice, reasoning: Some("evaluator: no options to score, first legal default".to_string()) };
        };

        // A plan produces zero usable instructions when nothing scores
        // legally; pass rather than post an illegal deploy (spec §4.4.5).
        if best.score <= 0.0 {
            let choice = context
                .request
                .options
                .iter()
                .find(|o| context.request.is_cancel_option(&o.option_id))
                .map(|o| o.option_id.clone())
                .unwrap_or_default();
            return BrainDecision { choice, reasoning: Some("evaluator: no legal target scored above zero, passing".to_string()) };
        }

        if !context.request.is_cancel_option(&best.option_id) {
            self.planner.pop_ready();
        }

        BrainDecision { choice: best.option_id.clone(), reasoning: Some(best.reasoning.join("; ")) }
    }

    fn on_my_card_entered_play(&mut self, blueprint_id: &str, card_id: &str) {
        self.planner.on_my_card_entered_play(blueprint_id, card_id);
    }

    fn get_personality_name(&self) -> &str {
        "Evaluator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecisionRequest, GameHistory};
    use swgemp_core::Owner;
    use swgemp_gameplay::{apply_event, BoardState, DecisionEvent, Event, NullObserver, PutCardInPlay, RawDecisionOption, Zone};
    use swgemp_cards::CardRegistry;

    fn registry_with_restricted_character() -> CardRegistry {
        let dir = std::env::temp_dir().join(format!("swgemp-evalbrain-test-{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("light.json"),
            r#"[{"blueprintId":"1_77","title":"Moisture Farmer","type":"Character","gametext":"Deploys only on Tatooine."}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("dark.json"), "[]").unwrap();
        let registry = CardRegistry::load(&dir).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        registry
    }

    fn deploy_decision(options: Vec<(&str, usize)>) -> DecisionEvent {
        let raw = options
            .into_iter()
            .map(|(id, index)| RawDecisionOption {
                option_id: id.to_string(),
                display_text: format!("Deploy to location {index}"),
                card_id: None,
                target_location: Some(index),
            })
            .collect();
        DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "ACTION_CHOICE".to_string(),
            prompt: "Choose a location".to_string(),
            no_pass: false,
            default_value: None,
            options: raw,
            selectable: None,
        }
    }

    #[tokio::test]
    async fn picks_the_allowed_system_for_a_restricted_card() {
        let registry: &'static CardRegistry = Box::leak(Box::new(registry_with_restricted_character()));
        let mut board = BoardState::default();
        board.current_phase = "Deploy Phase".to_string();
        board.ensure_location(0).resolve("Coruscant: Imperial City", true, false, true);
        board.ensure_location(1).resolve("Tatooine: Mos Eisley", true, false, true);
        let mut observer = NullObserver;
        apply_event(
            &mut board,
            &Event::PutCardInPlay(PutCardInPlay {
                card_id: "c1".to_string(),
                blueprint_id: "1_77".to_string(),
                owner: Owner::Me,
                zone: Zone::Hand,
                location_index: None,
                attached_to: None,
                location_title: None,
            }),
            registry,
            &mut observer,
        );

        let event = deploy_decision(vec![("0", 0), ("1", 1)]);
        let request = DecisionRequest::from_event(&event);
        let history = GameHistory::default();
        let ctx = BrainContext { board: &board, history: &history, request: &request };

        let mut brain = EvaluatorBrain::new(registry);
        let decision = brain.make_decision(&ctx).await;
        assert_eq!(decision.choice, "1");
    }

    #[tokio::test]
    async fn passes_when_no_deploy_target_is_legal() {
        let registry: &'static CardRegistry = Box::leak(Box::new(registry_with_restricted_character()));
        let mut board = BoardState::default();
        board.current_phase = "Deploy Phase".to_string();
        board.ensure_location(0).resolve("Coruscant: Imperial City", true, false, true);
        let mut observer = NullObserver;
        apply_event(
            &mut board,
            &Event::PutCardInPlay(PutCardInPlay {
                card_id: "c1".to_string(),
                blueprint_id: "1_77".to_string(),
                owner: Owner::Me,
                zone: Zone::Hand,
                location_index: None,
                attached_to: None,
                location_title: None,
            }),
            registry,
            &mut observer,
        );

        let mut options = deploy_decision(vec![("0", 0)]).options;
        options.push(RawDecisionOption {
            option_id: "pass".to_string(),
            display_text: "Pass".to_string(),
            card_id: None,
            target_location: None,
        });
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: None,
            raw_decision_type: "ACTION_CHOICE".to_string(),
            prompt: "Choose a location".to_string(),
            no_pass: false,
            default_value: None,
            options,
            selectable: None,
        };
        let request = DecisionRequest::from_event(&event);
        let history = GameHistory::default();
        let ctx = BrainContext { board: &board, history: &history, request: &request };

        let mut brain = EvaluatorBrain::new(registry);
        let decision = brain.make_decision(&ctx).await;
        assert_eq!(decision.choice, "pass");
    }
}
