//! The Brain contract (spec §4.4.2): the core owns zero brain logic, only
//! the interface and the safety net around it. Modeled as `async_trait`
//! like the teacher's `Player` trait.

use crate::context::BrainContext;
use crate::context::BrainDecision;
use swgemp_gameplay::BoardState;

#[async_trait::async_trait]
pub trait Brain: Send {
    /// Chooses an option for the decision in `context`. Panicking or
    /// blocking indefinitely here is a brain bug; C5 treats any error the
    /// implementation surfaces (by returning an empty choice) as a brain
    /// exception and falls back per spec §7.
    async fn make_decision(&mut self, context: &BrainContext<'_>) -> BrainDecision;

    /// Called once at the start of a game. Default no-op.
    async fn on_game_start(&mut self, _board: &BoardState) {}

    /// Called exactly once per game, whether won or lost (spec §6.3).
    /// Default no-op.
    async fn on_game_end(&mut self, _won: bool, _final_state: &BoardState) {}

    /// Notified when a card owned by the bot enters play, so a brain with
    /// an in-flight deployment plan can bind a previously-unknown ship's
    /// `card_id` (spec §4.3 "Deployment-plan coupling", §4.4.5 "deferred
    /// binding"). Brains without a deploy planner leave this a no-op.
    fn on_my_card_entered_play(&mut self, _blueprint_id: &str, _card_id: &str) {}

    fn get_personality_name(&self) -> &str;
}
