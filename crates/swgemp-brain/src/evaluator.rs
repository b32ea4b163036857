//! Evaluator framework: pluggable scorers a brain combines to rank
//! decision options (spec §4.4.2 "the core owns only the contract").
//!
//! Score bands are advisory, not enforced by the framework itself: `<= 0`
//! illegal/forbidden, `5..20` low-priority, `20..50` moderate, `50..80`
//! preferred, `> 80` decisive. Brains are free to use their own scale;
//! [`CombinedEvaluator`] only sums whatever its evaluators return.

use crate::context::{BrainContext, DecisionOption};

/// A single scored option with a human-readable trail of why it scored
/// that way, useful for logging a brain's reasoning (spec §4.4.2).
#[derive(Debug, Clone)]
pub struct EvaluatedAction {
    pub option_id: String,
    pub score: f64,
    pub reasoning: Vec<String>,
}

/// One scoring concern (board presence, deploy cost, threat response...).
/// `can_evaluate` lets a narrow evaluator opt out of options outside its
/// domain without every evaluator needing to handle every option kind.
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &str;
    fn can_evaluate(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> bool;
    fn evaluate(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> EvaluatedAction;
}

/// Aggregates a fixed set of evaluators into one score per option, summing
/// every evaluator that opts in and concatenating their reasoning trails.
///
/// Generic over `'e` so a brain can build its evaluator list fresh per
/// decision, borrowing that decision's planner state and registry instead
/// of needing every evaluator to own (or statically outlive) them.
pub struct CombinedEvaluator<'e> {
    evaluators: Vec<Box<dyn Evaluator + 'e>>,
}

impl<'e> CombinedEvaluator<'e> {
    pub fn new(evaluators: Vec<Box<dyn Evaluator + 'e>>) -> Self {
        Self { evaluators }
    }

    /// Scores every selectable option in `ctx.request`, highest score
    /// first. An option no evaluator opts into scores 0 with an empty
    /// reasoning trail rather than being dropped, so it still sorts
    /// predictably among other unscored options.
    pub fn evaluate_all(&self, ctx: &BrainContext<'_>) -> Vec<EvaluatedAction> {
        let mut scored: Vec<EvaluatedAction> = ctx
            .request
            .selectable_options()
            .map(|option| self.evaluate_one(option, ctx))
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    fn evaluate_one(&self, option: &DecisionOption, ctx: &BrainContext<'_>) -> EvaluatedAction {
        let mut score = 0.0;
        let mut reasoning = Vec::new();
        for evaluator in &self.evaluators {
            if evaluator.can_evaluate(option, ctx) {
                let result = evaluator.evaluate(option, ctx);
                score += result.score;
                reasoning.extend(result.reasoning);
            }
        }
        EvaluatedAction { option_id: option.option_id.clone(), score, reasoning }
    }
}
