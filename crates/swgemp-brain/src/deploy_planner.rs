//! Deploy Planner (spec §4.4.5): orders a batch of candidate deployments
//! by card type, honors "Deploys only on X" restrictions, and defers a
//! pilot's boarding instruction until the ship it pilots has itself
//! entered play and been assigned a `card_id` in the same phase.

use std::collections::VecDeque;
use swgemp_cards::{Card, CardRegistry, CardType};
use swgemp_core::{BlueprintId, CardId};
use swgemp_gameplay::DeploymentPlanObserver;

/// Coarse category used only to order the deploy queue (spec §4.4.5
/// "locations, then ships/vehicles, then characters, with fallback").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DeployRank {
    Location = 0,
    ShipOrVehicle = 1,
    Character = 2,
    Other = 3,
}

fn rank_of(card: Option<&Card>) -> DeployRank {
    match card.map(|c| &c.card_type) {
        Some(CardType::Location) => DeployRank::Location,
        Some(CardType::Starship) | Some(CardType::Vehicle) => DeployRank::ShipOrVehicle,
        Some(CardType::Character) => DeployRank::Character,
        _ => DeployRank::Other,
    }
}

/// One queued deployment. `card_id` is `None` until the server confirms
/// the card entered play (spec §4.3 "Deployment-plan coupling").
#[derive(Debug, Clone)]
pub struct DeploymentInstruction {
    pub blueprint_id: BlueprintId,
    pub card_id: Option<CardId>,
    pub target_system: Option<String>,
    /// Set when this instruction is a pilot boarding a ship deployed in
    /// the same phase: execution waits until that ship's blueprint has a
    /// known `card_id` (spec §4.4.5 "deferred binding").
    pub awaiting_ship_blueprint: Option<BlueprintId>,
    /// The ship's bound `card_id`, filled in once its `PUT_CARD_IN_PLAY`
    /// event arrives (spec §4.4.5 "the event processor binds the assigned
    /// card_id on the instruction", seed scenario S6).
    pub aboard_ship_card_id: Option<CardId>,
}

impl DeploymentInstruction {
    pub fn is_ready(&self) -> bool {
        self.awaiting_ship_blueprint.is_none()
    }
}

/// An ordered queue of pending deployments for the current phase.
#[derive(Debug, Default)]
pub struct DeployPlanner {
    queue: VecDeque<DeploymentInstruction>,
}

impl DeployPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the queue from a set of candidate blueprints, ordering by
    /// type (locations first) and attaching the first allowed system from
    /// each card's deploy restrictions, if any. `pilot_boards` pairs a
    /// pilot blueprint with the ship blueprint it is meant to board when
    /// both deploy in the same phase.
    pub fn plan(
        &mut self,
        registry: &CardRegistry,
        candidates: &[BlueprintId],
        pilot_boards: &[(BlueprintId, BlueprintId)],
    ) {
        let mut instructions: Vec<(DeployRank, DeploymentInstruction)> = candidates
            .iter()
            .map(|blueprint_id| {
                let card = registry.get(blueprint_id);
                let target_system = card
                    .map(|c| c.allowed_systems())
                    .filter(|systems| !systems.is_empty())
                    .and_then(|systems| systems.iter().next().cloned());
                let awaiting_ship_blueprint = pilot_boards
                    .iter()
                    .find(|(pilot, _)| pilot == blueprint_id)
                    .map(|(_, ship)| ship.clone());
                (
                    rank_of(card),
                    DeploymentInstruction {
                        blueprint_id: blueprint_id.clone(),
                        card_id: None,
                        target_system,
                        awaiting_ship_blueprint,
                        aboard_ship_card_id: None,
                    },
                )
            })
            .collect();
        instructions.sort_by_key(|(rank, _)| *rank);
        self.queue = instructions.into_iter().map(|(_, i)| i).collect();
    }

    /// The next instruction ready to execute, skipping any still deferred
    /// on an unbound ship.
    pub fn next_ready(&self) -> Option<&DeploymentInstruction> {
        self.queue.iter().find(|i| i.is_ready())
    }

    pub fn pop_ready(&mut self) -> Option<DeploymentInstruction> {
        let index = self.queue.iter().position(|i| i.is_ready())?;
        self.queue.remove(index)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

impl DeploymentPlanObserver for DeployPlanner {
    fn on_my_card_entered_play(&mut self, blueprint_id: &str, card_id: &str) {
        for instruction in self.queue.iter_mut() {
            if instruction.blueprint_id == blueprint_id && instruction.card_id.is_none() {
                instruction.card_id = Some(card_id.to_string());
            }
            if instruction.awaiting_ship_blueprint.as_deref() == Some(blueprint_id) {
                instruction.awaiting_ship_blueprint = None;
                instruction.aboard_ship_card_id = Some(card_id.to_string());
            }
        }
    }
}
