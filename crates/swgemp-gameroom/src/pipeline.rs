//! Decision pipeline orchestration (spec §4.4.3–§4.4.4): turns a brain's
//! raw choice into a safe, postable option id, applying the safety
//! overrides in order and consulting the wedge detector.

use crate::wedge::WedgeDetector;
use rand::Rng;
use swgemp_brain::{BrainDecision, DecisionRequest, EvaluatedAction};

/// What the pipeline decided to actually post, if anything.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub option_id: String,
    /// True when the decision should be abandoned rather than posted —
    /// either there was truly nothing legal to choose, or a non-choice
    /// wedge forced the worker to let the channel advance instead
    /// (spec §4.4.4 "for other types, abandoning further processing").
    pub abandon: bool,
    /// True when this outcome was forced by the wedge detector rather
    /// than flowing straight from the brain's own choice.
    pub wedge_broken: bool,
}

fn highest_scored_selectable(request: &DecisionRequest, ranked: Option<&[EvaluatedAction]>) -> Option<String> {
    if let Some(ranked) = ranked {
        for action in ranked {
            if request.option(&action.option_id).map(|o| o.selectable).unwrap_or(false) {
                return Some(action.option_id.clone());
            }
        }
    }
    request.selectable_options().next().map(|o| o.option_id.clone())
}

/// Applies the three safety overrides in order, first match wins
/// (spec §4.4.3).
fn apply_safety_overrides(request: &DecisionRequest, choice: String, ranked: Option<&[EvaluatedAction]>) -> String {
    // Null/empty choice.
    if choice.is_empty() && request.no_pass {
        if let Some(option) = request.first_non_cancel_option() {
            return option.option_id.clone();
        }
    }
    // Cancel-when-required.
    if request.no_pass && request.is_cancel_option(&choice) {
        if let Some(option) = request.first_non_cancel_option() {
            return option.option_id.clone();
        }
    }
    // Non-selectable choice (covers an unknown option id too: treated the
    // same as "not selectable").
    let selectable = request.option(&choice).map(|o| o.selectable).unwrap_or(false);
    if !selectable {
        if let Some(alt) = highest_scored_selectable(request, ranked) {
            return alt;
        }
    }
    choice
}

/// Runs the full pipeline for one decision: safety overrides, then the
/// wedge check, returning the option id C2 should post (or a signal to
/// abandon the decision entirely).
pub fn resolve_decision(
    request: &DecisionRequest,
    brain_decision: BrainDecision,
    ranked: Option<&[EvaluatedAction]>,
    wedge: &mut WedgeDetector,
    rng: &mut impl Rng,
) -> DecisionOutcome {
    let safe_choice = apply_safety_overrides(request, brain_decision.choice, ranked);
    if safe_choice.is_empty() {
        return DecisionOutcome { option_id: String::new(), abandon: true, wedge_broken: false };
    }

    let is_wedge = wedge.record(&request.decision_id, request.decision_type, &request.prompt, &safe_choice);
    if !is_wedge {
        return DecisionOutcome { option_id: safe_choice, abandon: false, wedge_broken: false };
    }

    log::warn!(
        "[pipeline] wedge detected on decision {} ({}): {} repeated",
        request.decision_id,
        request.prompt,
        safe_choice
    );
    wedge.reset();
    if request.decision_type == Some(swgemp_gameplay::DecisionType::MultipleChoice) {
        let alternatives: Vec<&str> = request
            .selectable_options()
            .map(|o| o.option_id.as_str())
            .filter(|id| *id != safe_choice)
            .collect();
        if alternatives.is_empty() {
            DecisionOutcome { option_id: String::new(), abandon: true, wedge_broken: true }
        } else {
            let index = rng.random_range(0..alternatives.len());
            DecisionOutcome { option_id: alternatives[index].to_string(), abandon: false, wedge_broken: true }
        }
    } else {
        DecisionOutcome { option_id: String::new(), abandon: true, wedge_broken: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use swgemp_gameplay::{DecisionEvent, DecisionType, RawDecisionOption};

    fn request_no_pass(options: Vec<(&str, &str, bool)>) -> DecisionRequest {
        let selectable = options.iter().map(|(_, _, s)| *s).collect();
        let raw = options
            .into_iter()
            .map(|(id, text, _)| RawDecisionOption {
                option_id: id.to_string(),
                display_text: text.to_string(),
                card_id: None,
                target_location: None,
            })
            .collect();
        let event = DecisionEvent {
            decision_id: "d1".to_string(),
            decision_type: Some(DecisionType::MultipleChoice),
            raw_decision_type: "MULTIPLE_CHOICE".to_string(),
            prompt: "Choose".to_string(),
            no_pass: true,
            default_value: None,
            options: raw,
            selectable: Some(selectable),
        };
        DecisionRequest::from_event(&event)
    }

    #[test]
    fn empty_choice_with_no_pass_substitutes_first_non_cancel() {
        let request = request_no_pass(vec![("0", "Cancel", true), ("1", "Deploy Luke", true)]);
        let mut wedge = WedgeDetector::new();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let outcome = resolve_decision(
            &request,
            BrainDecision { choice: String::new(), reasoning: None },
            None,
            &mut wedge,
            &mut rng,
        );
        assert_eq!(outcome.option_id, "1");
        assert!(!outcome.abandon);
    }

    #[test]
    fn cancel_choice_with_no_pass_substitutes_first_non_cancel() {
        let request = request_no_pass(vec![("0", "Cancel", true), ("1", "Deploy Luke", true)]);
        let mut wedge = WedgeDetector::new();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let outcome = resolve_decision(
            &request,
            BrainDecision { choice: "0".to_string(), reasoning: None },
            None,
            &mut wedge,
            &mut rng,
        );
        assert_eq!(outcome.option_id, "1");
    }

    #[test]
    fn non_selectable_choice_falls_back_to_selectable_alternative() {
        let request = request_no_pass(vec![("0", "Deploy Vader", false), ("1", "Deploy Luke", true)]);
        let mut wedge = WedgeDetector::new();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let outcome = resolve_decision(
            &request,
            BrainDecision { choice: "0".to_string(), reasoning: None },
            None,
            &mut wedge,
            &mut rng,
        );
        assert_eq!(outcome.option_id, "1");
    }

    #[test]
    fn third_identical_choice_breaks_the_wedge_with_a_different_option() {
        let request = request_no_pass(vec![("0", "Deploy Luke", true), ("1", "Deploy Han", true)]);
        let mut wedge = WedgeDetector::new();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        for _ in 0..2 {
            let outcome = resolve_decision(
                &request,
                BrainDecision { choice: "0".to_string(), reasoning: None },
                None,
                &mut wedge,
                &mut rng,
            );
            assert_eq!(outcome.option_id, "0");
            assert!(!outcome.wedge_broken);
        }
        let outcome = resolve_decision(
            &request,
            BrainDecision { choice: "0".to_string(), reasoning: None },
            None,
            &mut wedge,
            &mut rng,
        );
        assert_eq!(outcome.option_id, "1");
        assert!(outcome.wedge_broken);
    }
}
