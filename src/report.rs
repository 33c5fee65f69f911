//! Text outputs of a run: predictions, data base / rule base dumps and per-generation statistics.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bitvec::prelude::*;
use csv::Writer;

use crate::data_base::{DataBase, Dataset};
use crate::error::{FuzzyChiError, Result};
use crate::fuzzy_rules::RuleBase;
use crate::genetic_algorithm::GenerationStats;

/// One line per example: `<expected label> <predicted label>`.
pub fn write_predictions<P: AsRef<Path>>(
    path: P,
    dataset: &Dataset,
    predictions: &[usize],
    data_base: &DataBase,
) -> Result<()> {
    if predictions.len() != dataset.len() {
        return Err(FuzzyChiError::Configuration(format!(
            "{} predictions for {} examples",
            predictions.len(),
            dataset.len()
        )));
    }
    let mut file = BufWriter::new(File::create(path)?);
    for (example, &predicted) in dataset.iter().zip(predictions) {
        writeln!(
            file,
            "{} {}",
            data_base.class_label(example.class_index).unwrap_or("?"),
            data_base.class_label(predicted).unwrap_or("?")
        )?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_data_base<P: AsRef<Path>>(path: P, data_base: &DataBase) -> Result<()> {
    std::fs::write(path, data_base.to_string())?;
    Ok(())
}

/// Active rules only, preceded by their count.
pub fn write_rule_base<P: AsRef<Path>>(
    path: P,
    rule_base: &RuleBase,
    mask: &BitSlice,
    data_base: &DataBase,
) -> Result<()> {
    rule_base.check_mask(mask)?;
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "@Number of rules: {}", mask.count_ones())?;
    writeln!(file)?;
    write!(file, "{}", rule_base.dump(data_base, mask))?;
    file.flush()?;
    Ok(())
}

/// `#`-prefixed metadata lines followed by one CSV row per generation.
pub fn write_generation_stats_to_csv<P: AsRef<Path>>(
    path: P,
    stats_history: &[GenerationStats],
    metadata: &str,
) -> Result<()> {
    let mut file = File::create(path)?;

    if !metadata.is_empty() {
        writeln!(file, "# {}", metadata.replace('\n', "\n# "))?;
    }

    let mut wtr = Writer::from_writer(file);
    wtr.write_record([
        "generation",
        "evaluations",
        "best",
        "mean",
        "worst",
        "threshold",
        "restarts",
        "active_rules_best",
    ])?;

    for stats in stats_history {
        wtr.write_record(&[
            stats.generation.to_string(),
            stats.evaluations.to_string(),
            format!("{:.5}", stats.best),
            format!("{:.5}", stats.mean),
            format!("{:.5}", stats.worst),
            format!("{:.2}", stats.threshold),
            stats.restarts.to_string(),
            stats.active_rules_best.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
