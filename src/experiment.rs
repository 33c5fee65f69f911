use std::path::Path;

use bitvec::prelude::*;
use log::{info, warn};
use rand::{rngs::SmallRng, SeedableRng};

use crate::config::RunConfig;
use crate::data_base::{load_data_base, load_dataset, DataBase, Dataset};
use crate::error::{FuzzyChiError, Result};
use crate::fuzzy_rules::{evaluate, Evaluation, InductionSummary, InferenceEngine, RuleBase, RuleBaseBuilder};
use crate::genetic_algorithm::{select_rules, GenerationStats, SelectionOutcome};
use crate::report::{write_data_base, write_generation_stats_to_csv, write_predictions, write_rule_base};

pub const DATA_BASE_FILE: &str = "data_base.txt";
pub const INITIAL_RULE_BASE_FILE: &str = "rule_base_initial.txt";
pub const RULE_BASE_FILE: &str = "rule_base.txt";
pub const VALIDATION_PREDICTIONS_FILE: &str = "validation.pred";
pub const TEST_PREDICTIONS_FILE: &str = "test.pred";
pub const STATS_FILE: &str = "generation_stats.csv";
pub const CONFIG_FILE: &str = "config.toml";

/// Accuracy of the complete and of the selected rule base.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub summary: InductionSummary,
    pub initial_validation: Evaluation,
    pub initial_test: Evaluation,
    pub validation: Evaluation,
    pub test: Evaluation,
    pub selection: SelectionOutcome,
    /// Selected rules of each class.
    pub selected_rules_per_class: Vec<usize>,
    pub stats_history: Vec<GenerationStats>,
}

fn required<'a>(path: Option<&'a Path>, what: &str) -> Result<&'a Path> {
    path.ok_or_else(|| FuzzyChiError::Configuration(format!("{} is required", what)))
}

/// Loads the data sets, induces the rule base, selects its best subset and
/// writes every output file into `config.output_dir`.
pub fn run_experiment(config: &RunConfig) -> Result<ExperimentReport> {
    config.validate()?;
    let training_path = required(config.training_file.as_deref(), "training_file")?;
    let validation_path = required(config.validation_path(), "validation_file")?;
    let test_path = required(config.test_file.as_deref(), "test_file")?;

    let data_base = load_data_base(training_path, config.n_labels)?;
    let training = load_dataset(training_path, &data_base)?;
    let validation = load_dataset(validation_path, &data_base)?;
    let test = load_dataset(test_path, &data_base)?;
    let data_base = data_base.with_class_distribution(&training);
    info!(
        "Loaded {} training, {} validation and {} test examples",
        training.len(),
        validation.len(),
        test.len()
    );

    std::fs::create_dir_all(&config.output_dir)?;
    config.save_to_file(config.output_dir.join(CONFIG_FILE))?;
    write_data_base(config.output_dir.join(DATA_BASE_FILE), &data_base)?;

    let induction = RuleBaseBuilder::new(&data_base)
        .with_t_norm(config.t_norm)
        .induce(&training)?;
    let rule_base = induction.rule_base;
    info!("Rule base generated:\n{}", induction.summary);

    let engine = InferenceEngine::new(&data_base, config.t_norm);
    let full_mask = rule_base.full_mask();
    write_rule_base(
        config.output_dir.join(INITIAL_RULE_BASE_FILE),
        &rule_base,
        &full_mask,
        &data_base,
    )?;
    let initial_validation = evaluate(&engine, &rule_base, &full_mask, &validation, config.reasoning)?;
    let initial_test = evaluate(&engine, &rule_base, &full_mask, &test, config.reasoning)?;
    info!(
        "Accuracy with every rule: validation {:.4}, test {:.4}",
        initial_validation.accuracy, initial_test.accuracy
    );

    let rng = SmallRng::seed_from_u64(config.seed);
    let (selection, stats_history) = select_rules(
        &engine,
        &rule_base,
        &training,
        config.selection_reasoning,
        config.max_evaluations,
        rng,
    )?;

    let validation_evaluation = evaluate(&engine, &rule_base, &selection.mask, &validation, config.reasoning)?;
    let test_evaluation = evaluate(&engine, &rule_base, &selection.mask, &test, config.reasoning)?;
    info!(
        "Accuracy with {} selected rules: validation {:.4}, test {:.4}",
        selection.mask.count_ones(),
        validation_evaluation.accuracy,
        test_evaluation.accuracy
    );
    let selected_rules_per_class = rule_base.rules_per_class(&selection.mask, data_base.num_classes());

    write_outputs(
        config,
        &data_base,
        &rule_base,
        &selection.mask,
        (&validation, &validation_evaluation),
        (&test, &test_evaluation),
    )?;
    if config.write_stats {
        let metadata = format!(
            "seed = {}\nn_labels = {}\nt_norm = {}\nmax_evaluations = {}\nrules = {}",
            config.seed,
            data_base.num_linguistic_labels(),
            config.t_norm,
            config.max_evaluations,
            rule_base.len()
        );
        write_generation_stats_to_csv(config.output_dir.join(STATS_FILE), &stats_history, &metadata)?;
    }

    Ok(ExperimentReport {
        summary: induction.summary,
        initial_validation,
        initial_test,
        validation: validation_evaluation,
        test: test_evaluation,
        selection,
        selected_rules_per_class,
        stats_history,
    })
}

fn write_outputs(
    config: &RunConfig,
    data_base: &DataBase,
    rule_base: &RuleBase,
    mask: &BitSlice,
    validation: (&Dataset, &Evaluation),
    test: (&Dataset, &Evaluation),
) -> Result<()> {
    if mask.not_any() && !rule_base.is_empty() {
        warn!("No rule selected, the most frequent class is always predicted");
    }
    write_rule_base(config.output_dir.join(RULE_BASE_FILE), rule_base, mask, data_base)?;
    write_predictions(
        config.output_dir.join(VALIDATION_PREDICTIONS_FILE),
        validation.0,
        &validation.1.predictions,
        data_base,
    )?;
    write_predictions(
        config.output_dir.join(TEST_PREDICTIONS_FILE),
        test.0,
        &test.1.predictions,
        data_base,
    )?;
    Ok(())
}
