//! The worker loop, decision pipeline, and wedge detector (C5 core + the
//! worker's top-level state machine, spec §2, §4.4, §5).

mod pipeline;
mod snapshot;
mod state;
mod wedge;
mod worker;

pub use pipeline::{resolve_decision, DecisionOutcome};
pub use snapshot::AdminSnapshot;
pub use state::WorkerState;
pub use wedge::WedgeDetector;
pub use worker::Worker;
