use std::fmt::Write;

use bitvec::prelude::*;

use super::FuzzyRule;
use crate::data_base::DataBase;
use crate::error::{FuzzyChiError, Result};

/// Ordered rules produced by induction. Which of them take part in inference
/// is decided by a separate bit mask, one bit per rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBase {
    rules: Vec<FuzzyRule>,
    // Rules generated by a single training example
    unique: BitVec,
}

impl RuleBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<FuzzyRule>) -> Self {
        let unique = bitvec![0; rules.len()];
        Self { rules, unique }
    }

    pub fn push(&mut self, rule: FuzzyRule, is_unique: bool) {
        self.rules.push(rule);
        self.unique.push(is_unique);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FuzzyRule> {
        self.rules.iter()
    }

    pub fn is_unique(&self, index: usize) -> bool {
        self.unique.get(index).is_some_and(|bit| *bit)
    }

    /// Mask selecting every rule.
    pub fn full_mask(&self) -> BitVec {
        bitvec![1; self.rules.len()]
    }

    pub fn check_mask(&self, mask: &BitSlice) -> Result<()> {
        if mask.len() != self.rules.len() {
            return Err(FuzzyChiError::Configuration(format!(
                "Mask of length {} does not fit a rule base of {} rules",
                mask.len(),
                self.rules.len()
            )));
        }
        Ok(())
    }

    /// Rules whose bit is set, with their position in the rule base.
    pub fn active_rules<'a>(&'a self, mask: &'a BitSlice) -> impl Iterator<Item = (usize, &'a FuzzyRule)> + 'a {
        mask.iter_ones()
            .filter_map(move |index| self.rules.get(index).map(|rule| (index, rule)))
    }

    /// Number of selected rules of each class.
    pub fn rules_per_class(&self, mask: &BitSlice, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_classes];
        for (_, rule) in self.active_rules(mask) {
            if let Some(count) = counts.get_mut(rule.class_index()) {
                *count += 1;
            }
        }
        counts
    }

    /// One numbered line per selected rule.
    pub fn dump(&self, data_base: &DataBase, mask: &BitSlice) -> String {
        let mut output = String::new();
        for (position, (_, rule)) in self.active_rules(mask).enumerate() {
            // Writing into a String cannot fail
            let _ = writeln!(output, "Rule ({}): {}", position, rule.display(data_base));
        }
        output
    }
}
