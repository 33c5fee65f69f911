use rand::seq::IndexedRandom;
use rand::RngCore;

use crate::genetic_algorithm::Chromosome;

// CROSSOVER OPERATOR

pub trait Crossover {
    /// Produces two unevaluated children from two parents of the same length.
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> (Chromosome, Chromosome);
}

/// Half Uniform Crossover: exactly half of the differing bits (at least one)
/// are flipped in both children.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuxCrossover;

impl HuxCrossover {
    pub fn new() -> Self {
        Self
    }
}

impl Crossover for HuxCrossover {
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> (Chromosome, Chromosome) {
        let mut child1 = Chromosome::new(parent1.bits().to_bitvec());
        let mut child2 = Chromosome::new(parent2.bits().to_bitvec());

        let positions = parent1.differing_positions(parent2);
        if positions.is_empty() {
            return (child1, child2);
        }
        let exchanges = (positions.len() / 2).max(1);

        for &position in positions.choose_multiple(rng, exchanges) {
            child1.flip(position);
            child2.flip(position);
        }
        (child1, child2)
    }
}
