use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};

use super::{Antecedents, FuzzyRule, RuleBase, TNorm};
use crate::data_base::{DataBase, Dataset};
use crate::error::Result;

/// Antecedent vector generated by one or more training rows.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    antecedents: Antecedents,
    // Distinct classes in the order they were first observed
    classes: Vec<usize>,
    support: usize,
}

impl Candidate {
    fn has_conflict(&self) -> bool {
        self.classes.len() > 1
    }
}

/// Counters reported after rule generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InductionSummary {
    pub candidates: usize,
    pub rules: usize,
    pub rules_per_class: Vec<usize>,
    /// Number of times a new class was observed for an existing candidate.
    pub conflicts: usize,
    pub ambiguous_rules: usize,
    pub unique_rules: usize,
}

impl fmt::Display for InductionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Candidate rules:\t{}", self.candidates)?;
        writeln!(f, "Rules:\t{}", self.rules)?;
        for (class_index, count) in self.rules_per_class.iter().enumerate() {
            writeln!(f, "Rules of class {}:\t{}", class_index, count)?;
        }
        writeln!(f, "Class conflicts:\t{}", self.conflicts)?;
        writeln!(f, "Ambiguous rules:\t{}", self.ambiguous_rules)?;
        writeln!(f, "Unique rules:\t{}", self.unique_rules)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Induction {
    pub rule_base: RuleBase,
    pub summary: InductionSummary,
}

/// Generates one weighted rule per distinct antecedent vector of the training set.
pub struct RuleBaseBuilder<'a> {
    data_base: &'a DataBase,
    t_norm: TNorm,
}

impl<'a> RuleBaseBuilder<'a> {
    pub fn new(data_base: &'a DataBase) -> Self {
        Self {
            data_base,
            t_norm: TNorm::default(),
        }
    }

    pub fn with_t_norm(mut self, t_norm: TNorm) -> Self {
        self.t_norm = t_norm;
        self
    }

    /// Rules keep the order in which their antecedents first appear in `training`.
    pub fn induce(&self, training: &Dataset) -> Result<Induction> {
        info!("Rule generation over {} examples", training.len());
        let num_classes = self.data_base.num_classes();

        let (candidates, conflicts) = self.collect_candidates(training)?;
        debug!("{} candidate rules, {} class conflicts", candidates.len(), conflicts);

        let mass = self.matching_mass(&candidates, training);

        let mut rule_base = RuleBase::new();
        let mut summary = InductionSummary {
            candidates: candidates.len(),
            rules_per_class: vec![0; num_classes],
            conflicts,
            ..InductionSummary::default()
        };

        for (candidate, class_mass) in candidates.into_iter().zip(mass) {
            let Some((class_index, weight)) = penalized_certainty_factor(&candidate.classes, &class_mass)
            else {
                continue;
            };
            let is_unique = candidate.support == 1;
            summary.rules += 1;
            summary.rules_per_class[class_index] += 1;
            if candidate.has_conflict() {
                summary.ambiguous_rules += 1;
            }
            if is_unique {
                summary.unique_rules += 1;
            }
            rule_base.push(FuzzyRule::new(candidate.antecedents, class_index, weight), is_unique);
        }

        if rule_base.is_empty() {
            warn!("Every candidate rule was discarded, the most frequent class will always be predicted");
        }
        info!(
            "Generated {} rules out of {} candidates",
            summary.rules, summary.candidates
        );

        Ok(Induction { rule_base, summary })
    }

    fn collect_candidates(&self, training: &Dataset) -> Result<(Vec<Candidate>, usize)> {
        let mut index_of: HashMap<Antecedents, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut conflicts = 0;

        for (row, example) in training.iter().enumerate() {
            let antecedents = self.data_base.encode_example(row, example)?;
            match index_of.get(&antecedents) {
                Some(&position) => {
                    let candidate = &mut candidates[position];
                    candidate.support += 1;
                    if !candidate.classes.contains(&example.class_index) {
                        candidate.classes.push(example.class_index);
                        conflicts += 1;
                    }
                }
                None => {
                    index_of.insert(antecedents.clone(), candidates.len());
                    candidates.push(Candidate {
                        antecedents,
                        classes: vec![example.class_index],
                        support: 1,
                    });
                }
            }
        }
        Ok((candidates, conflicts))
    }

    /// Sum of the matching degrees of every training row, per candidate and class.
    fn matching_mass(&self, candidates: &[Candidate], training: &Dataset) -> Vec<Vec<f64>> {
        let num_classes = self.data_base.num_classes();
        let mut mass = vec![vec![0.0; num_classes]; candidates.len()];

        for example in training {
            // memberships[variable][label]
            let memberships: Vec<Vec<f64>> = self
                .data_base
                .variables()
                .iter()
                .zip(&example.values)
                .map(|(variable, value)| {
                    (0..variable.label_count())
                        .map(|label| variable.membership_degree(label, value))
                        .collect()
                })
                .collect();

            for (candidate, class_mass) in candidates.iter().zip(mass.iter_mut()) {
                let degree = self.matching_degree(&memberships, &candidate.antecedents);
                if degree > 0.0 {
                    class_mass[example.class_index] += degree;
                }
            }
        }
        mass
    }

    fn matching_degree(&self, memberships: &[Vec<f64>], antecedents: &Antecedents) -> f64 {
        let mut degree = 1.0;
        for (labels, &label) in memberships.iter().zip(antecedents.iter()) {
            let membership = labels.get(label).copied().unwrap_or(0.0);
            if membership == 0.0 {
                return 0.0;
            }
            degree = self.t_norm.combine(degree, membership);
        }
        degree
    }
}

/// Class and weight of a candidate: among its observed classes, the one whose
/// mass most exceeds the mass of every other class. `None` when no class
/// reaches a positive weight.
pub fn penalized_certainty_factor(observed: &[usize], class_mass: &[f64]) -> Option<(usize, f64)> {
    let total: f64 = class_mass.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let mut classes = observed.to_vec();
    classes.sort_unstable();

    let mut best: Option<(usize, f64)> = None;
    let mut best_weight = 0.0;
    for class_index in classes {
        let Some(&own) = class_mass.get(class_index) else {
            continue;
        };
        let others = total - own;
        let weight = (own - others) / total;
        if weight > best_weight {
            best_weight = weight;
            best = Some((class_index, weight));
        }
    }
    best
}
