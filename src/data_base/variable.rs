use std::fmt;

use crate::error::{FuzzyChiError, Result};

/// A raw field decoded into the domain of its variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Numeric(f64),
    Nominal(usize),
}

/// Triangular membership function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzySet {
    pub left: f64,
    pub mid: f64,
    pub right: f64,
}

impl FuzzySet {
    pub fn new(left: f64, mid: f64, right: f64) -> Self {
        Self { left, mid, right }
    }

    pub fn membership_degree(&self, value: f64) -> f64 {
        if self.left <= value && value <= self.mid {
            if self.left == value && self.mid == value {
                1.0
            } else {
                (value - self.left) / (self.mid - self.left)
            }
        } else if self.mid <= value && value <= self.right {
            if self.mid == value && self.right == value {
                1.0
            } else {
                (self.right - value) / (self.right - self.mid)
            }
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyVariable {
    name: String,
    fuzzy_sets: Vec<FuzzySet>,
    // Points where two consecutive labels have the same membership degree
    merge_points: Vec<f64>,
}

impl FuzzyVariable {
    /// Builds a strong (Ruspini) partition of `[lower, upper]` with `n_labels` triangles.
    pub fn uniform(name: impl Into<String>, lower: f64, upper: f64, n_labels: usize) -> Result<Self> {
        let name = name.into();
        if n_labels < 2 {
            return Err(FuzzyChiError::Configuration(format!(
                "Variable {} needs at least 2 linguistic labels, got {}",
                name, n_labels
            )));
        }
        if !(lower <= upper) {
            return Err(FuzzyChiError::Configuration(format!(
                "Variable {} has an empty range [{}, {}]",
                name, lower, upper
            )));
        }

        let half_base = (upper - lower) / (n_labels - 1) as f64;
        let mut fuzzy_sets: Vec<FuzzySet> = Vec::with_capacity(n_labels);
        let mut merge_points: Vec<f64> = Vec::with_capacity(n_labels - 1);

        for label in 0..n_labels {
            let mid = lower + half_base * label as f64;
            let left = if label == 0 { mid } else { mid - half_base };
            let right = if label == n_labels - 1 { mid } else { mid + half_base };

            if let Some(previous) = fuzzy_sets.last() {
                merge_points.push(mid - (mid - previous.mid) / 2.0);
            }
            fuzzy_sets.push(FuzzySet::new(left, mid, right));
        }

        Ok(Self {
            name,
            fuzzy_sets,
            merge_points,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fuzzy_sets(&self) -> &[FuzzySet] {
        &self.fuzzy_sets
    }

    pub fn merge_points(&self) -> &[f64] {
        &self.merge_points
    }

    /// Label with the highest membership degree, located through the merge points.
    pub fn best_label(&self, value: f64) -> usize {
        self.merge_points
            .iter()
            .position(|&point| value < point)
            .unwrap_or(self.merge_points.len())
    }

    pub fn membership_degree(&self, label: usize, value: f64) -> f64 {
        self.fuzzy_sets
            .get(label)
            .map_or(0.0, |set| set.membership_degree(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NominalVariable {
    name: String,
    values: Vec<String>,
}

impl NominalVariable {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn category_index(&self, raw: &str) -> Option<usize> {
        if let Some(index) = self.values.iter().position(|v| v == raw) {
            return Some(index);
        }
        // Integer domains may be written as "3.0" in the data section
        let as_number: f64 = raw.parse().ok()?;
        if as_number.fract() != 0.0 {
            return None;
        }
        let normalised = format!("{}", as_number as i64);
        self.values.iter().position(|v| *v == normalised)
    }
}

/// Input variable of the problem: fuzzified or categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Fuzzy(FuzzyVariable),
    Nominal(NominalVariable),
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Fuzzy(var) => var.name(),
            Variable::Nominal(var) => var.name(),
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, Variable::Nominal(_))
    }

    pub fn label_count(&self) -> usize {
        match self {
            Variable::Fuzzy(var) => var.fuzzy_sets.len(),
            Variable::Nominal(var) => var.values.len(),
        }
    }

    /// Decodes a raw token of the data section.
    pub fn parse_value(&self, raw: &str) -> Result<Value> {
        match self {
            Variable::Fuzzy(var) => raw.parse::<f64>().map(Value::Numeric).map_err(|_| {
                FuzzyChiError::UnknownCategory {
                    variable: var.name.clone(),
                    value: raw.to_string(),
                }
            }),
            Variable::Nominal(var) => var.category_index(raw).map(Value::Nominal).ok_or_else(|| {
                FuzzyChiError::UnknownCategory {
                    variable: var.name.clone(),
                    value: raw.to_string(),
                }
            }),
        }
    }

    /// `None` when the value does not belong to this kind of variable.
    pub fn best_label(&self, value: &Value) -> Option<usize> {
        match (self, value) {
            (Variable::Fuzzy(var), Value::Numeric(x)) => Some(var.best_label(*x)),
            (Variable::Nominal(_), Value::Nominal(index)) => Some(*index),
            _ => None,
        }
    }

    /// Membership of `value` to `label`; values of the wrong kind never match.
    pub fn membership_degree(&self, label: usize, value: &Value) -> f64 {
        match (self, value) {
            (Variable::Fuzzy(var), Value::Numeric(x)) => var.membership_degree(label, *x),
            (Variable::Nominal(_), Value::Nominal(index)) => {
                if *index == label {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    pub fn label_name(&self, label: usize) -> String {
        match self {
            Variable::Fuzzy(_) => format!("L_{}", label),
            Variable::Nominal(var) => var
                .values
                .get(label)
                .cloned()
                .unwrap_or_else(|| format!("?{}", label)),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Fuzzy(var) => {
                writeln!(f, "{}:", var.name)?;
                for (label, set) in var.fuzzy_sets.iter().enumerate() {
                    writeln!(f, " L_{}: ({},{},{})", label, set.left, set.mid, set.right)?;
                }
                Ok(())
            }
            Variable::Nominal(var) => writeln!(f, "{}: {{{}}}", var.name, var.values.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_membership() {
        let set = FuzzySet::new(0.0, 0.5, 1.0);
        assert_eq!(set.membership_degree(0.5), 1.0);
        assert_eq!(set.membership_degree(0.25), 0.5);
        assert_eq!(set.membership_degree(0.75), 0.5);
        assert_eq!(set.membership_degree(1.5), 0.0);
    }

    #[test]
    fn test_degenerate_shoulder_is_one_at_peak() {
        let set = FuzzySet::new(0.0, 0.0, 1.0);
        assert_eq!(set.membership_degree(0.0), 1.0);
        let set = FuzzySet::new(0.0, 1.0, 1.0);
        assert_eq!(set.membership_degree(1.0), 1.0);
    }

    #[test]
    fn test_ruspini_partition() {
        let var = FuzzyVariable::uniform("x", 0.0, 10.0, 3).unwrap();
        let sets = var.fuzzy_sets();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0], FuzzySet::new(0.0, 0.0, 5.0));
        assert_eq!(sets[1], FuzzySet::new(0.0, 5.0, 10.0));
        assert_eq!(sets[2], FuzzySet::new(5.0, 10.0, 10.0));
        assert_eq!(var.merge_points(), &[2.5, 7.5]);

        // memberships of a strong partition sum to one
        for x in [0.0, 1.0, 3.3, 5.0, 9.9, 10.0] {
            let total: f64 = (0..3).map(|l| var.membership_degree(l, x)).sum();
            assert!((total - 1.0).abs() < 1e-12, "sum at {} was {}", x, total);
        }
    }

    #[test]
    fn test_best_label_uses_merge_points() {
        let var = FuzzyVariable::uniform("x", 0.0, 10.0, 3).unwrap();
        assert_eq!(var.best_label(0.0), 0);
        assert_eq!(var.best_label(2.4), 0);
        assert_eq!(var.best_label(2.5), 1);
        assert_eq!(var.best_label(7.6), 2);
        assert_eq!(var.best_label(42.0), 2);
    }

    #[test]
    fn test_too_few_labels_is_rejected() {
        assert!(FuzzyVariable::uniform("x", 0.0, 1.0, 1).is_err());
    }

    #[test]
    fn test_nominal_parsing_accepts_integer_spelling() {
        let var = Variable::Nominal(NominalVariable::new(
            "n",
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
        ));
        assert_eq!(var.parse_value("2").unwrap(), Value::Nominal(1));
        assert_eq!(var.parse_value("3.0").unwrap(), Value::Nominal(2));
        assert!(var.parse_value("4").is_err());
        assert!(var.parse_value("2.5").is_err());
    }

    #[test]
    fn test_wrong_kind_never_matches() {
        let fuzzy = Variable::Fuzzy(FuzzyVariable::uniform("x", 0.0, 1.0, 2).unwrap());
        assert_eq!(fuzzy.membership_degree(0, &Value::Nominal(0)), 0.0);
        assert_eq!(fuzzy.best_label(&Value::Nominal(0)), None);
    }
}
