use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyChiError, Result};
use crate::fuzzy_rules::{ReasoningMethod, TNorm};

/// Parameters of one run: input files, outputs and algorithm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    /// Linguistic labels per fuzzy variable.
    pub n_labels: usize,
    pub t_norm: TNorm,
    /// Reasoning method used to classify the validation and test sets.
    pub reasoning: ReasoningMethod,
    /// Reasoning method used as fitness during rule selection.
    pub selection_reasoning: ReasoningMethod,
    pub max_evaluations: usize,
    pub training_file: Option<PathBuf>,
    /// Defaults to the training file.
    pub validation_file: Option<PathBuf>,
    pub test_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub write_stats: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_labels: 3,
            t_norm: TNorm::Product,
            reasoning: ReasoningMethod::WinningRule,
            selection_reasoning: ReasoningMethod::WinningRule,
            max_evaluations: 5000,
            training_file: None,
            validation_file: None,
            test_file: None,
            output_dir: PathBuf::from("results"),
            write_stats: true,
        }
    }
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FuzzyChiError::Configuration(format!(
                "Failed to read config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: RunConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| FuzzyChiError::Configuration(format!("Failed to serialize: {}", e)))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_labels < 2 || self.n_labels > 255 {
            return Err(FuzzyChiError::Configuration(format!(
                "n_labels must be between 2 and 255, got {}",
                self.n_labels
            )));
        }
        if self.training_file.is_none() {
            return Err(FuzzyChiError::Configuration(
                "training_file is required".to_string(),
            ));
        }
        if self.test_file.is_none() {
            return Err(FuzzyChiError::Configuration("test_file is required".to_string()));
        }
        Ok(())
    }

    /// Validation set path, falling back to the training set.
    pub fn validation_path(&self) -> Option<&Path> {
        self.validation_file
            .as_deref()
            .or(self.training_file.as_deref())
    }
}
