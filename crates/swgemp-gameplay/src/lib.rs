//! Board State Projection: the deterministic fold from parsed server
//! events to the bot's view of the game (spec §3, §4.3).

mod board_state;
mod card_in_play;
mod event;
mod location;
mod processor;
mod zone;

pub use board_state::{BoardState, CurrentPlayer, ZoneState};
pub use card_in_play::{CardInPlay, CardSnapshot};
pub use event::{
    DecisionEvent, DecisionType, Event, GameStateSnapshot, MoveCardInPlay, PutCardInPlay,
    RawDecisionOption,
};
pub use location::LocationInPlay;
pub use processor::{apply_event, DeploymentPlanObserver, NullObserver, Outcome};
pub use zone::Zone;
