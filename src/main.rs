use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fuzzy_chi_ga::config::RunConfig;
use fuzzy_chi_ga::experiment::run_experiment;
use fuzzy_chi_ga::fuzzy_rules::{ReasoningMethod, TNorm};

/// Fuzzy rule-based classifier with genetic rule selection
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// TOML configuration file; command line options override its values
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Training dataset (KEEL format)
    #[arg(long)]
    train: Option<PathBuf>,

    /// Validation dataset, defaults to the training dataset
    #[arg(long)]
    validation: Option<PathBuf>,

    /// Test dataset
    #[arg(long)]
    test: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Linguistic labels per variable
    #[arg(short = 'l', long)]
    labels: Option<usize>,

    /// Fitness evaluations of the rule selection
    #[arg(short = 'e', long)]
    evaluations: Option<usize>,

    /// product | minimum
    #[arg(long)]
    t_norm: Option<TNorm>,

    /// winning_rule | additive_combination
    #[arg(short = 'r', long)]
    reasoning: Option<ReasoningMethod>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(train) = self.train {
            config.training_file = Some(train);
        }
        if let Some(validation) = self.validation {
            config.validation_file = Some(validation);
        }
        if let Some(test) = self.test {
            config.test_file = Some(test);
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(labels) = self.labels {
            config.n_labels = labels;
        }
        if let Some(evaluations) = self.evaluations {
            config.max_evaluations = evaluations;
        }
        if let Some(t_norm) = self.t_norm {
            config.t_norm = t_norm;
        }
        if let Some(reasoning) = self.reasoning {
            config.reasoning = reasoning;
        }
        Ok(config)
    }
}

// Execution example:
// RUST_LOG=info cargo run -- --train iris-10-1tra.dat --test iris-10-1tst.dat -l 3 -e 5000
// cargo run -- -c run.toml --seed 7

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config()?;

    let report = run_experiment(&config).context("Experiment failed")?;

    println!("{}", report.summary);
    println!(
        "All rules ({}): validation accuracy = {:.4}, test accuracy = {:.4}",
        report.selection.mask.len(),
        report.initial_validation.accuracy,
        report.initial_test.accuracy
    );
    println!(
        "Selected rules ({}): validation accuracy = {:.4}, test accuracy = {:.4}",
        report.selection.mask.count_ones(),
        report.validation.accuracy,
        report.test.accuracy
    );
    println!("Selected rules per class: {:?}", report.selected_rules_per_class);
    println!(
        "Fired rules on test: {} ({} unique), generations = {}, evaluations = {}, restarts = {}",
        report.test.fired.total,
        report.test.fired.unique,
        report.selection.generations,
        report.selection.evaluations,
        report.selection.restarts
    );
    Ok(())
}
