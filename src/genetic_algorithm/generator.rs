use bitvec::prelude::*;
use rand::{Rng, RngCore};

use super::Chromosome;
use crate::error::{FuzzyChiError, Result};

pub trait ChromosomeGenerator {
    fn generate(&self, len: usize, rng: &mut dyn RngCore) -> Chromosome;
}

/// Each rule is selected independently with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomChromosomeGenerator {
    selection_probability: f64,
}

impl RandomChromosomeGenerator {
    pub fn new() -> Self {
        Self {
            selection_probability: 0.5,
        }
    }

    pub fn new_with_probability(selection_probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&selection_probability) {
            return Err(FuzzyChiError::Configuration(format!(
                "selection_probability should be a probability (from 0 to 1). The current value is {}",
                selection_probability
            )));
        }
        Ok(Self {
            selection_probability,
        })
    }
}

impl Default for RandomChromosomeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromosomeGenerator for RandomChromosomeGenerator {
    fn generate(&self, len: usize, rng: &mut dyn RngCore) -> Chromosome {
        let bits: BitVec = (0..len)
            .map(|_| rng.random_bool(self.selection_probability))
            .collect();
        Chromosome::new(bits)
    }
}
