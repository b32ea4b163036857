//! Decision Pipeline deep logic (C5): the Brain contract, an evaluator
//! framework brains compose scorers from, and the Deploy Planner (spec
//! §4.4).

mod brain;
mod context;
mod deploy_evaluators;
mod deploy_planner;
mod evaluator;
mod evaluator_brain;
mod static_brain;

pub use brain::Brain;
pub use context::{BrainContext, BrainDecision, DecisionOption, DecisionRequest, GameHistory, OpponentDeploy};
pub use deploy_evaluators::{DeployRestrictionEvaluator, PassOptionEvaluator, ShipBoardEvaluator};
pub use deploy_planner::{DeployPlanner, DeploymentInstruction};
pub use evaluator::{CombinedEvaluator, EvaluatedAction, Evaluator};
pub use evaluator_brain::EvaluatorBrain;
pub use static_brain::StaticBrain;
