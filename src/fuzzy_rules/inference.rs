use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Antecedents, FuzzyRule, RuleBase};
use crate::data_base::{DataBase, Dataset, Example};
use crate::error::{FuzzyChiError, Result};

/// Conjunction operator used for the matching degree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TNorm {
    #[default]
    Product,
    Minimum,
}

impl TNorm {
    pub(crate) fn combine(self, accumulated: f64, degree: f64) -> f64 {
        match self {
            TNorm::Product => accumulated * degree,
            TNorm::Minimum => accumulated.min(degree),
        }
    }
}

impl FromStr for TNorm {
    type Err = FuzzyChiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "product" => Ok(TNorm::Product),
            "minimum" | "min" => Ok(TNorm::Minimum),
            other => Err(FuzzyChiError::Configuration(format!("Unknown t-norm: '{}'", other))),
        }
    }
}

impl fmt::Display for TNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TNorm::Product => write!(f, "product"),
            TNorm::Minimum => write!(f, "minimum"),
        }
    }
}

/// Fuzzy reasoning method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningMethod {
    /// The single strongest rule of each class decides.
    #[default]
    WinningRule,
    /// Association degrees are summed per class.
    AdditiveCombination,
}

impl FromStr for ReasoningMethod {
    type Err = FuzzyChiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "winning_rule" | "winning-rule" | "wr" => Ok(ReasoningMethod::WinningRule),
            "additive_combination" | "additive-combination" | "ac" => {
                Ok(ReasoningMethod::AdditiveCombination)
            }
            other => Err(FuzzyChiError::Configuration(format!(
                "Unknown reasoning method: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReasoningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningMethod::WinningRule => write!(f, "winning_rule"),
            ReasoningMethod::AdditiveCombination => write!(f, "additive_combination"),
        }
    }
}

/// Result of classifying one example.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub class_index: usize,
    /// Best association degree per class (winning rule) or their sum (additive).
    pub degrees: Vec<f64>,
    /// Rule that decided the prediction. Only set by the winning rule method.
    pub winning_rule: Option<usize>,
}

/// Matches examples against the rules of a rule base.
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'a> {
    data_base: &'a DataBase,
    t_norm: TNorm,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(data_base: &'a DataBase, t_norm: TNorm) -> Self {
        Self { data_base, t_norm }
    }

    pub fn data_base(&self) -> &'a DataBase {
        self.data_base
    }

    pub fn t_norm(&self) -> TNorm {
        self.t_norm
    }

    /// Degree to which `example` satisfies every antecedent. Stops at the first zero.
    /// `example` must already be checked against the data base.
    pub(crate) fn matching_degree(&self, example: &Example, antecedents: &Antecedents) -> f64 {
        let mut degree = 1.0;
        for (variable, (&label, value)) in antecedents.iter().zip(&example.values).enumerate() {
            let membership = self.data_base.membership_degree(variable, label, value);
            if membership == 0.0 {
                return 0.0;
            }
            degree = self.t_norm.combine(degree, membership);
        }
        degree
    }

    pub(crate) fn association_degree(&self, example: &Example, rule: &FuzzyRule) -> f64 {
        self.matching_degree(example, rule.antecedents()) * rule.weight()
    }

    /// Classifies `example` with the rules selected by `mask`.
    ///
    /// Classes are compared in increasing index order with a strict `>`, so
    /// the lowest index wins a tie. Without any matching rule the most
    /// frequent class of the data base is returned.
    ///
    /// Fails when `example` does not fit the data base or `mask` does not
    /// cover the rule base.
    pub fn infer(
        &self,
        example: &Example,
        rule_base: &RuleBase,
        mask: &BitSlice,
        method: ReasoningMethod,
    ) -> Result<Inference> {
        rule_base.check_mask(mask)?;
        self.data_base.check_example(0, example)?;
        Ok(self.infer_checked(example, rule_base, mask, method))
    }

    fn infer_checked(
        &self,
        example: &Example,
        rule_base: &RuleBase,
        mask: &BitSlice,
        method: ReasoningMethod,
    ) -> Inference {
        let num_classes = self.data_base.num_classes();
        let mut degrees = vec![0.0; num_classes];
        let mut strongest: Vec<Option<usize>> = vec![None; num_classes];

        for (index, rule) in rule_base.active_rules(mask) {
            let class_index = rule.class_index();
            if class_index >= num_classes {
                continue;
            }
            let degree = self.association_degree(example, rule);
            match method {
                ReasoningMethod::WinningRule => {
                    if degree > degrees[class_index] {
                        degrees[class_index] = degree;
                        strongest[class_index] = Some(index);
                    }
                }
                ReasoningMethod::AdditiveCombination => degrees[class_index] += degree,
            }
        }

        match strongest_class(&degrees) {
            Some(class_index) => Inference {
                class_index,
                winning_rule: strongest[class_index],
                degrees,
            },
            None => Inference {
                class_index: self.data_base.most_frequent_class(),
                degrees,
                winning_rule: None,
            },
        }
    }

    pub fn classify(
        &self,
        example: &Example,
        rule_base: &RuleBase,
        mask: &BitSlice,
        method: ReasoningMethod,
    ) -> Result<usize> {
        Ok(self.infer(example, rule_base, mask, method)?.class_index)
    }
}

/// Class with the highest positive degree, the lowest index on ties.
pub(crate) fn strongest_class(degrees: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_degree = 0.0;
    for (class_index, &degree) in degrees.iter().enumerate() {
        if degree > best_degree {
            best_degree = degree;
            best = Some(class_index);
        }
    }
    best
}

/// Distinct rules that decided at least one prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FiredRules {
    pub total: usize,
    /// Fired rules generated by a single training example.
    pub unique: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub correct: usize,
    pub predictions: Vec<usize>,
    pub fired: FiredRules,
}

/// Classifies every example of `dataset` and compares with its class.
/// Accuracy of an empty dataset is 0.
pub fn evaluate(
    engine: &InferenceEngine<'_>,
    rule_base: &RuleBase,
    mask: &BitSlice,
    dataset: &Dataset,
    method: ReasoningMethod,
) -> Result<Evaluation> {
    rule_base.check_mask(mask)?;

    let mut predictions = Vec::with_capacity(dataset.len());
    let mut fired: BTreeSet<usize> = BTreeSet::new();
    let mut correct = 0;

    for (row, example) in dataset.iter().enumerate() {
        engine.data_base().check_example(row, example)?;
        let inference = engine.infer_checked(example, rule_base, mask, method);
        if inference.class_index == example.class_index {
            correct += 1;
        }
        if let Some(rule) = inference.winning_rule {
            fired.insert(rule);
        }
        predictions.push(inference.class_index);
    }

    let accuracy = if dataset.is_empty() {
        0.0
    } else {
        correct as f64 / dataset.len() as f64
    };
    let fired = FiredRules {
        total: fired.len(),
        unique: fired.iter().filter(|&&rule| rule_base.is_unique(rule)).count(),
    };

    Ok(Evaluation {
        accuracy,
        correct,
        predictions,
        fired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_base::{FuzzyVariable, NominalVariable, Value, Variable};

    fn data_base() -> DataBase {
        let training: Dataset = vec![
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 1),
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 1),
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 0),
        ]
        .into_iter()
        .collect();
        DataBase::new(
            vec![
                Variable::Fuzzy(FuzzyVariable::uniform("x", 0.0, 1.0, 3).unwrap()),
                Variable::Nominal(NominalVariable::new("c", vec!["a".into(), "b".into()])),
            ],
            vec!["zero".into(), "one".into()],
            3,
        )
        .unwrap()
        .with_class_distribution(&training)
    }

    fn rule(labels: Vec<usize>, class_index: usize, weight: f64) -> FuzzyRule {
        FuzzyRule::new(Antecedents::new(labels), class_index, weight)
    }

    #[test]
    fn test_matching_degree_product_and_minimum() {
        let db = data_base();
        let example = Example::new(vec![Value::Numeric(0.25), Value::Nominal(0)], 0);
        let antecedents = Antecedents::new(vec![1, 0]);
        let product = InferenceEngine::new(&db, TNorm::Product);
        let minimum = InferenceEngine::new(&db, TNorm::Minimum);
        assert!((product.matching_degree(&example, &antecedents) - 0.5).abs() < 1e-12);
        assert!((minimum.matching_degree(&example, &antecedents) - 0.5).abs() < 1e-12);

        // nominal mismatch short-circuits
        let other = Antecedents::new(vec![1, 1]);
        assert_eq!(product.matching_degree(&example, &other), 0.0);
        assert_eq!(minimum.matching_degree(&example, &other), 0.0);
    }

    #[test]
    fn test_winning_rule_keeps_the_strongest_rule() {
        let db = data_base();
        let engine = InferenceEngine::new(&db, TNorm::Product);
        let mut rule_base = RuleBase::new();
        rule_base.push(rule(vec![1, 0], 0, 0.9), false);
        rule_base.push(rule(vec![0, 0], 1, 0.6), false);
        rule_base.push(rule(vec![1, 0], 1, 0.3), false);
        let example = Example::new(vec![Value::Numeric(0.25), Value::Nominal(0)], 1);

        let wr = engine
            .infer(&example, &rule_base, &rule_base.full_mask(), ReasoningMethod::WinningRule)
            .unwrap();
        // class 0: 0.5 * 0.9 = 0.45, class 1: max(0.5 * 0.6, 0.5 * 0.3) = 0.3
        assert_eq!(wr.class_index, 0);
        assert_eq!(wr.winning_rule, Some(0));

        let ac = engine.infer(
            &example,
            &rule_base,
            &rule_base.full_mask(),
            ReasoningMethod::AdditiveCombination,
        )
        .unwrap();
        // class 1 sums to 0.45 as well, the lower index keeps the tie
        assert_eq!(ac.class_index, 0);
        assert_eq!(ac.winning_rule, None);

        let mask = bitvec![0, 1, 1];
        assert_eq!(
            engine
                .classify(&example, &rule_base, &mask, ReasoningMethod::WinningRule)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_no_matching_rule_falls_back_to_most_frequent_class() {
        let db = data_base();
        let engine = InferenceEngine::new(&db, TNorm::Product);
        let mut rule_base = RuleBase::new();
        rule_base.push(rule(vec![2, 1], 0, 1.0), false);
        let example = Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 0);
        for method in [ReasoningMethod::WinningRule, ReasoningMethod::AdditiveCombination] {
            let inference = engine
                .infer(&example, &rule_base, &rule_base.full_mask(), method)
                .unwrap();
            assert_eq!(inference.class_index, 1);
            assert_eq!(inference.winning_rule, None);
        }
    }

    #[test]
    fn test_short_example_is_rejected() {
        let db = data_base();
        let engine = InferenceEngine::new(&db, TNorm::Product);
        let mut rule_base = RuleBase::new();
        rule_base.push(rule(vec![0, 1], 1, 1.0), false);
        let example = Example::new(vec![Value::Nominal(0)], 0);
        for method in [ReasoningMethod::WinningRule, ReasoningMethod::AdditiveCombination] {
            let result = engine.classify(&example, &rule_base, &rule_base.full_mask(), method);
            assert!(matches!(
                result,
                Err(FuzzyChiError::DimensionMismatch {
                    expected: 2,
                    found: 1,
                    ..
                })
            ));
        }
        assert!(engine
            .infer(&example, &rule_base, &bitvec![1, 1], ReasoningMethod::WinningRule)
            .is_err());
    }

    #[test]
    fn test_evaluate_counts_fired_rules() {
        let db = data_base();
        let engine = InferenceEngine::new(&db, TNorm::Product);
        let mut rule_base = RuleBase::new();
        rule_base.push(rule(vec![0, 0], 0, 1.0), true);
        rule_base.push(rule(vec![2, 1], 1, 1.0), false);
        rule_base.push(rule(vec![1, 1], 1, 1.0), false);
        let dataset: Dataset = vec![
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 0),
            Example::new(vec![Value::Numeric(1.0), Value::Nominal(1)], 1),
            Example::new(vec![Value::Numeric(1.0), Value::Nominal(1)], 0),
        ]
        .into_iter()
        .collect();

        let evaluation = evaluate(
            &engine,
            &rule_base,
            &rule_base.full_mask(),
            &dataset,
            ReasoningMethod::WinningRule,
        )
        .unwrap();
        assert_eq!(evaluation.predictions, vec![0, 1, 1]);
        assert_eq!(evaluation.correct, 2);
        assert!((evaluation.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(evaluation.fired, FiredRules { total: 2, unique: 1 });
    }

    #[test]
    fn test_evaluate_rejects_wrong_mask_length() {
        let db = data_base();
        let engine = InferenceEngine::new(&db, TNorm::Product);
        let rule_base = RuleBase::from_rules(vec![rule(vec![0, 0], 0, 1.0)]);
        let result = evaluate(
            &engine,
            &rule_base,
            &bitvec![1, 1],
            &Dataset::default(),
            ReasoningMethod::WinningRule,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!("AC".parse::<ReasoningMethod>().unwrap(), ReasoningMethod::AdditiveCombination);
        assert_eq!("winning_rule".parse::<ReasoningMethod>().unwrap(), ReasoningMethod::WinningRule);
        assert_eq!("min".parse::<TNorm>().unwrap(), TNorm::Minimum);
        assert!("max".parse::<TNorm>().is_err());
    }
}
