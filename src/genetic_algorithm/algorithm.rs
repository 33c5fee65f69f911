use std::cmp::Ordering;

use bitvec::prelude::*;
use log::{debug, info};
use rand::Rng;

use super::base::{AccuracyScorer, Chromosome, FitnessScorer};
use super::generator::{ChromosomeGenerator, RandomChromosomeGenerator};
use super::operators::{Crossover, HuxCrossover, IncestPrevention, SurvivorSelector, TruncationSurvival};
use crate::data_base::Dataset;
use crate::error::Result;
use crate::fuzzy_rules::{InferenceEngine, ReasoningMethod, RuleBase};

/// Restarts allowed without improving the best fitness.
pub const MAX_RESTARTS: usize = 3;

/// Best mask found by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub mask: BitVec,
    pub fitness: f64,
    pub evaluations: usize,
    pub generations: usize,
    pub restarts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    /// Fitness evaluations spent so far.
    pub evaluations: usize,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
    pub threshold: f64,
    pub restarts: usize,
    pub active_rules_best: usize,
}

/// Steady-state genetic algorithm over rule-selection masks.
///
/// Each generation shuffles the population, mates the pairs that pass incest
/// prevention, evaluates the offspring and keeps the fittest. A generation
/// without offspring lowers the incest threshold; once it falls below zero
/// the population is rebuilt around its best chromosome. The run ends when
/// the evaluation budget is spent, the best fitness reaches 1 or
/// [`MAX_RESTARTS`] restarts happen without improvement.
pub struct GeneticAlgorithm<'a, R> {
    population: Vec<Chromosome>,
    population_size: usize,
    chromosome_len: usize,
    scorer: Box<dyn FitnessScorer + 'a>,
    crossover: Box<dyn Crossover + 'a>,
    survivor_selector: Box<dyn SurvivorSelector + 'a>,
    generator: Box<dyn ChromosomeGenerator + 'a>,
    incest_prevention: IncestPrevention,
    max_evaluations: usize,
    remaining_evaluations: usize,
    evaluations: usize,
    rng: R,
}

impl<'a, R: Rng> GeneticAlgorithm<'a, R> {
    /// One chromosome per rule; a rule base of size 0 still gets a population of 1.
    pub fn new_with_size(
        chromosome_len: usize,
        scorer: Box<dyn FitnessScorer + 'a>,
        crossover: Box<dyn Crossover + 'a>,
        survivor_selector: Box<dyn SurvivorSelector + 'a>,
        generator: Box<dyn ChromosomeGenerator + 'a>,
        max_evaluations: usize,
        rng: R,
    ) -> Self {
        let population_size = chromosome_len.max(1);
        Self {
            population: Vec::with_capacity(population_size * 2),
            population_size,
            chromosome_len,
            scorer,
            crossover,
            survivor_selector,
            generator,
            incest_prevention: IncestPrevention::new(population_size),
            max_evaluations,
            remaining_evaluations: max_evaluations,
            evaluations: 0,
            rng,
        }
    }

    /// HUX crossover, truncation survival and random restarts.
    pub fn chc(
        chromosome_len: usize,
        scorer: Box<dyn FitnessScorer + 'a>,
        max_evaluations: usize,
        rng: R,
    ) -> Self {
        Self::new_with_size(
            chromosome_len,
            scorer,
            Box::new(HuxCrossover::new()),
            Box::new(TruncationSurvival::new()),
            Box::new(RandomChromosomeGenerator::new()),
            max_evaluations,
            rng,
        )
    }

    pub fn get_population(&self) -> &Vec<Chromosome> {
        &self.population
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn threshold(&self) -> f64 {
        self.incest_prevention.threshold()
    }

    /// Runs the search and returns the best mask.
    pub fn fit(&mut self) -> SelectionOutcome {
        self.run(None)
    }

    /// Same as [`fit`](Self::fit), also returning statistics of every generation.
    pub fn fit_with_stats_history(&mut self) -> (SelectionOutcome, Vec<GenerationStats>) {
        let mut history = Vec::new();
        let outcome = self.run(Some(&mut history));
        (outcome, history)
    }

    fn run(&mut self, mut history: Option<&mut Vec<GenerationStats>>) -> SelectionOutcome {
        self.remaining_evaluations = self.max_evaluations;
        self.evaluations = 0;
        self.incest_prevention.reset();

        if self.remaining_evaluations == 0 {
            let mut baseline = Chromosome::all_true(self.chromosome_len);
            let (fitness, _) = baseline.get_or_score(&*self.scorer);
            info!("No evaluations available, keeping every rule (fitness {:.4})", fitness);
            return SelectionOutcome {
                mask: baseline.into_bits(),
                fitness,
                evaluations: 1,
                generations: 0,
                restarts: 0,
            };
        }

        self.initialize_population(Chromosome::all_true(self.chromosome_len));
        self.evaluate();
        let mut best_fitness = self.survivor_selector.select(&mut self.population, self.population_size);
        info!("Initial population evaluated, best accuracy {:.4}", best_fitness);

        let mut generation = 0;
        let mut restarts = 0;

        while self.remaining_evaluations > 0 && best_fitness < 1.0 && restarts < MAX_RESTARTS {
            generation += 1;

            self.cross();
            let new_individuals = self.evaluate();
            let generation_best = self.survivor_selector.select(&mut self.population, self.population_size);

            if generation_best > best_fitness {
                best_fitness = generation_best;
                restarts = 0;
                info!(
                    "Evaluations remaining: {}, best accuracy: {:.4}",
                    self.remaining_evaluations, best_fitness
                );
            }

            if new_individuals == 0 {
                self.incest_prevention.cool_down();
                if self.incest_prevention.is_exhausted() {
                    info!("Restarting population (generation {})", generation);
                    self.restart();
                    self.evaluate();
                    self.incest_prevention.reset();
                    restarts += 1;
                }
            }

            let stats = self.generation_stats(generation, restarts);
            debug!(
                "Generation {}: best {:.4}, mean {:.4}, threshold {}",
                stats.generation, stats.best, stats.mean, stats.threshold
            );
            if let Some(history) = history.as_deref_mut() {
                history.push(stats);
            }
        }

        let best = self.best_chromosome();
        info!(
            "Rule selection finished after {} generations and {} evaluations: {} of {} rules, accuracy {:.4}",
            generation,
            self.evaluations,
            best.active_count(),
            self.chromosome_len,
            best.get_score()
        );

        SelectionOutcome {
            fitness: best.get_score(),
            mask: best.into_bits(),
            evaluations: self.evaluations,
            generations: generation,
            restarts,
        }
    }

    /// `first` followed by random chromosomes up to the population size.
    fn initialize_population(&mut self, first: Chromosome) {
        self.population.clear();
        self.population.push(first);
        while self.population.len() < self.population_size {
            let chromosome = self.generator.generate(self.chromosome_len, &mut self.rng);
            self.population.push(chromosome);
        }
    }

    /// Scores the chromosomes without a cached fitness. Returns how many were scored.
    fn evaluate(&mut self) -> usize {
        let mut scored = 0;
        for chromosome in self.population.iter_mut() {
            let (_, is_new) = chromosome.get_or_score(&*self.scorer);
            if is_new {
                scored += 1;
            }
        }
        self.evaluations += scored;
        self.remaining_evaluations = self.remaining_evaluations.saturating_sub(scored);
        scored
    }

    fn cross(&mut self) {
        let pairs = self
            .incest_prevention
            .mating_pairs(&mut self.population, &mut self.rng);
        for (i, j) in pairs {
            let (child1, child2) =
                self.crossover
                    .crossover(&self.population[i], &self.population[j], &mut self.rng);
            self.population.push(child1);
            self.population.push(child2);
        }
    }

    fn restart(&mut self) {
        let best = self.best_chromosome();
        self.initialize_population(best);
    }

    /// First chromosome with the highest fitness.
    fn best_chromosome(&self) -> Chromosome {
        let mut best: Option<&Chromosome> = None;
        for chromosome in &self.population {
            match best {
                Some(current) if chromosome.get_score() <= current.get_score() => {}
                _ => best = Some(chromosome),
            }
        }
        best.cloned()
            .unwrap_or_else(|| Chromosome::all_true(self.chromosome_len))
    }

    fn generation_stats(&self, generation: usize, restarts: usize) -> GenerationStats {
        let scores: Vec<f64> = self.population.iter().map(Chromosome::get_score).collect();
        let best = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let worst = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let mean = scores.iter().sum::<f64>() / scores.len().max(1) as f64;
        let best_chromosome = self
            .population
            .iter()
            .max_by(|a, b| a.get_score().partial_cmp(&b.get_score()).unwrap_or(Ordering::Equal));

        GenerationStats {
            generation,
            evaluations: self.evaluations,
            best,
            mean,
            worst,
            threshold: self.incest_prevention.threshold(),
            restarts,
            active_rules_best: best_chromosome.map_or(0, Chromosome::active_count),
        }
    }
}

/// Selects the subset of `rule_base` with the highest training accuracy.
pub fn select_rules<R: Rng>(
    engine: &InferenceEngine<'_>,
    rule_base: &RuleBase,
    training: &Dataset,
    method: ReasoningMethod,
    max_evaluations: usize,
    rng: R,
) -> Result<(SelectionOutcome, Vec<GenerationStats>)> {
    let scorer = AccuracyScorer::new(engine, rule_base, training, method)?;
    let mut ga = GeneticAlgorithm::chc(rule_base.len(), Box::new(scorer), max_evaluations, rng);
    Ok(ga.fit_with_stats_history())
}
