use rand::seq::SliceRandom;
use rand::RngCore;

use crate::genetic_algorithm::Chromosome;

//PAIRING OPERATOR
// Parents are paired at random and a pair only mates when its members are
// far enough apart. The distance required shrinks every generation that
// produces no offspring.

#[derive(Debug, Clone, PartialEq)]
pub struct IncestPrevention {
    initial_threshold: f64,
    threshold: f64,
}

impl IncestPrevention {
    /// Starts at a quarter of the population size.
    pub fn new(population_size: usize) -> Self {
        let initial_threshold = population_size as f64 / 4.0;
        Self {
            initial_threshold,
            threshold: initial_threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cool_down(&mut self) {
        self.threshold -= 1.0;
    }

    /// True once the population can no longer produce offspring and must restart.
    pub fn is_exhausted(&self) -> bool {
        self.threshold < 0.0
    }

    pub fn reset(&mut self) {
        self.threshold = self.initial_threshold;
    }

    pub fn allows(&self, parent1: &Chromosome, parent2: &Chromosome) -> bool {
        parent1.hamming_distance(parent2) as f64 / 2.0 > self.threshold
    }

    /// Shuffles the population and returns the index pairs allowed to mate.
    /// Pairs are `(0, 1), (2, 3), ...` of the shuffled order; the last two
    /// slots are never paired.
    pub fn mating_pairs(&self, population: &mut [Chromosome], rng: &mut dyn RngCore) -> Vec<(usize, usize)> {
        population.shuffle(rng);
        (0..population.len().saturating_sub(2))
            .step_by(2)
            .filter(|&i| self.allows(&population[i], &population[i + 1]))
            .map(|i| (i, i + 1))
            .collect()
    }
}
