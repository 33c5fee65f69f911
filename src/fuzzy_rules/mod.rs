mod induction;
mod inference;
mod rule;
mod rule_base;

pub use induction::{penalized_certainty_factor, Induction, InductionSummary, RuleBaseBuilder};
pub(crate) use inference::strongest_class;
pub use inference::{evaluate, Evaluation, FiredRules, Inference, InferenceEngine, ReasoningMethod, TNorm};
pub use rule::{Antecedents, FuzzyRule, RuleDisplay};
pub use rule_base::RuleBase;
