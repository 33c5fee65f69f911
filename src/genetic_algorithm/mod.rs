mod algorithm;
mod base;
mod generator;
mod operators;

pub use algorithm::{select_rules, GenerationStats, GeneticAlgorithm, SelectionOutcome, MAX_RESTARTS};
pub use base::{AccuracyScorer, Chromosome, FitnessScorer};
pub use generator::{ChromosomeGenerator, RandomChromosomeGenerator};
pub use operators::{Crossover, HuxCrossover, IncestPrevention, SurvivorSelector, TruncationSurvival};
