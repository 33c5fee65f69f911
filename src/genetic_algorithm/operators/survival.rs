//! Survivor selection: which chromosomes of parents plus offspring make it to the next generation.
use std::cmp::Ordering;

use crate::genetic_algorithm::Chromosome;

pub trait SurvivorSelector {
    /// Reduces `population` to at most `population_size` chromosomes.
    /// Returns the best fitness among the survivors.
    fn select(&self, population: &mut Vec<Chromosome>, population_size: usize) -> f64;
}

/// Keeps the `population_size` fittest chromosomes, sorted by descending fitness.
/// The sort is stable, so older chromosomes win ties against their offspring.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationSurvival;

impl TruncationSurvival {
    pub fn new() -> Self {
        Self
    }
}

impl SurvivorSelector for TruncationSurvival {
    fn select(&self, population: &mut Vec<Chromosome>, population_size: usize) -> f64 {
        population.sort_by(|a, b| {
            b.get_score()
                .partial_cmp(&a.get_score())
                .unwrap_or(Ordering::Equal)
        });
        population.truncate(population_size);
        population.first().map_or(0.0, Chromosome::get_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    #[test]
    fn test_truncation_keeps_the_best() {
        let mut population: Vec<Chromosome> = [0.2, 0.9, 0.5, 0.9, 0.1]
            .iter()
            .enumerate()
            .map(|(i, &fitness)| {
                let bits: BitVec = (0..3).map(|b| (i >> b) & 1 == 1).collect();
                Chromosome::new_with_fitness(bits, fitness)
            })
            .collect();
        let best = TruncationSurvival::new().select(&mut population, 3);

        assert_eq!(best, 0.9);
        let scores: Vec<f64> = population.iter().map(|c| c.get_score()).collect();
        assert_eq!(scores, vec![0.9, 0.9, 0.5]);
        // stable on ties: index 1 stays ahead of index 3
        assert_eq!(population[0].bits(), bits![1, 0, 0]);
        assert_eq!(population[1].bits(), bits![1, 1, 0]);
    }

    #[test]
    fn test_small_population_is_untouched() {
        let mut population = vec![Chromosome::new_with_fitness(bitvec![1], 0.3)];
        let best = TruncationSurvival::new().select(&mut population, 4);
        assert_eq!(best, 0.3);
        assert_eq!(population.len(), 1);
    }
}
