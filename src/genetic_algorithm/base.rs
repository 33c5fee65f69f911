use bitvec::prelude::*;

use crate::data_base::Dataset;
use crate::error::Result;
use crate::fuzzy_rules::{InferenceEngine, ReasoningMethod, RuleBase};

// Binary rule-selection mask with its cached fitness.
// The cache is dropped whenever a bit changes, so a chromosome is evaluated
// at most once per distinct mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    bits: BitVec,
    fitness: Option<f64>,
}

impl Chromosome {
    pub fn new(bits: BitVec) -> Self {
        Self { bits, fitness: None }
    }

    /// Every rule selected.
    pub fn all_true(len: usize) -> Self {
        Self::new(bitvec![1; len])
    }

    pub fn new_with_fitness(bits: BitVec, fitness: f64) -> Self {
        Self {
            bits,
            fitness: Some(fitness),
        }
    }

    pub fn bits(&self) -> &BitSlice {
        &self.bits
    }

    pub fn into_bits(self) -> BitVec {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Cached fitness, 0 for chromosomes not evaluated yet.
    pub fn get_score(&self) -> f64 {
        self.fitness.unwrap_or(0.0)
    }

    pub fn flip(&mut self, index: usize) {
        if index < self.bits.len() {
            let value = self.bits[index];
            self.bits.set(index, !value);
            self.fitness = None;
        }
    }

    pub fn differing_positions(&self, other: &Chromosome) -> Vec<usize> {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .enumerate()
            .filter(|(_, (a, b))| **a != **b)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn hamming_distance(&self, other: &Chromosome) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| **a != **b)
            .count()
    }

    /// Scores the chromosome unless a cached fitness exists.
    /// Returns the fitness and whether the scorer was called.
    pub fn get_or_score(&mut self, scorer: &dyn FitnessScorer) -> (f64, bool) {
        match self.fitness {
            Some(fitness) => (fitness, false),
            None => {
                let fitness = scorer.fitness(&self.bits);
                self.fitness = Some(fitness);
                (fitness, true)
            }
        }
    }
}

// FITNESS SCORER

pub trait FitnessScorer {
    fn fitness(&self, mask: &BitSlice) -> f64;
}

/// One non-zero (rule, class, association degree) triple of a training row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RuleMatch {
    rule: usize,
    class_index: usize,
    degree: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct ScoredRow {
    class_index: usize,
    matches: Vec<RuleMatch>,
}

/// Training accuracy of the rules selected by a mask.
///
/// Association degrees do not depend on the mask, so they are computed once
/// per (row, rule) at construction and each evaluation only replays them.
#[derive(Debug, Clone)]
pub struct AccuracyScorer {
    rows: Vec<ScoredRow>,
    num_classes: usize,
    default_class: usize,
    method: ReasoningMethod,
}

impl AccuracyScorer {
    pub fn new(
        engine: &InferenceEngine<'_>,
        rule_base: &RuleBase,
        training: &Dataset,
        method: ReasoningMethod,
    ) -> Result<Self> {
        let data_base = engine.data_base();
        let num_classes = data_base.num_classes();
        let mut rows = Vec::with_capacity(training.len());

        for (row, example) in training.iter().enumerate() {
            data_base.check_example(row, example)?;
            let matches = rule_base
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.class_index() < num_classes)
                .filter_map(|(index, rule)| {
                    let degree = engine.association_degree(example, rule);
                    (degree > 0.0).then_some(RuleMatch {
                        rule: index,
                        class_index: rule.class_index(),
                        degree,
                    })
                })
                .collect();
            rows.push(ScoredRow {
                class_index: example.class_index,
                matches,
            });
        }

        Ok(Self {
            rows,
            num_classes,
            default_class: data_base.most_frequent_class(),
            method,
        })
    }

    pub fn method(&self) -> ReasoningMethod {
        self.method
    }

    fn predict(&self, row: &ScoredRow, mask: &BitSlice, degrees: &mut [f64]) -> usize {
        degrees.iter_mut().for_each(|degree| *degree = 0.0);
        for rule_match in &row.matches {
            if !mask.get(rule_match.rule).is_some_and(|bit| *bit) {
                continue;
            }
            let slot = &mut degrees[rule_match.class_index];
            match self.method {
                ReasoningMethod::WinningRule => {
                    if rule_match.degree > *slot {
                        *slot = rule_match.degree;
                    }
                }
                ReasoningMethod::AdditiveCombination => *slot += rule_match.degree,
            }
        }
        crate::fuzzy_rules::strongest_class(degrees).unwrap_or(self.default_class)
    }
}

impl FitnessScorer for AccuracyScorer {
    fn fitness(&self, mask: &BitSlice) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let mut degrees = vec![0.0; self.num_classes];
        let hits = self
            .rows
            .iter()
            .filter(|row| self.predict(row, mask, &mut degrees) == row.class_index)
            .count();
        hits as f64 / self.rows.len() as f64
    }
}
