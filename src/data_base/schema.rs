use std::fmt;

use log::warn;

use super::{Dataset, Example, Value, Variable};
use crate::error::{FuzzyChiError, Result};
use crate::fuzzy_rules::Antecedents;

/// Immutable description of a classification problem: input variables,
/// class labels and the class distribution of the training data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBase {
    variables: Vec<Variable>,
    class_labels: Vec<String>,
    class_counts: Vec<usize>,
    most_frequent_class: usize,
    n_labels: usize,
}

impl DataBase {
    pub fn new(variables: Vec<Variable>, class_labels: Vec<String>, n_labels: usize) -> Result<Self> {
        if class_labels.is_empty() {
            return Err(FuzzyChiError::Configuration(
                "At least one class label is required".to_string(),
            ));
        }
        let class_counts = vec![0; class_labels.len()];
        Ok(Self {
            variables,
            class_labels,
            class_counts,
            most_frequent_class: 0,
            n_labels,
        })
    }

    /// Records how many examples of each class the training data holds and
    /// derives the default class from it (ties go to the lowest index).
    pub fn with_class_distribution(mut self, training: &Dataset) -> Self {
        self.class_counts = training.class_distribution(self.num_classes());
        self.most_frequent_class = most_frequent(&self.class_counts);
        if training.is_empty() {
            warn!("Empty training set, class {} used as default class", self.most_frequent_class);
        }
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    pub fn num_linguistic_labels(&self) -> usize {
        self.n_labels
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn class_label(&self, class_index: usize) -> Option<&str> {
        self.class_labels.get(class_index).map(String::as_str)
    }

    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.class_labels.iter().position(|l| l == label)
    }

    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    pub fn most_frequent_class(&self) -> usize {
        self.most_frequent_class
    }

    pub fn is_nominal(&self, variable: usize) -> bool {
        self.variables
            .get(variable)
            .is_some_and(Variable::is_nominal)
    }

    pub fn membership_degree(&self, variable: usize, label: usize, value: &Value) -> f64 {
        self.variables
            .get(variable)
            .map_or(0.0, |var| var.membership_degree(label, value))
    }

    /// Checks that an example can be matched against rules of this data base.
    pub fn check_example(&self, row: usize, example: &Example) -> Result<()> {
        if example.values.len() != self.num_variables() {
            return Err(FuzzyChiError::DimensionMismatch {
                row,
                expected: self.num_variables(),
                found: example.values.len(),
            });
        }
        if example.class_index >= self.num_classes() {
            return Err(FuzzyChiError::UnknownClass(format!(
                "class index {} in example {}",
                example.class_index, row
            )));
        }
        Ok(())
    }

    /// Antecedents of the rule generated by an example: the best label of each value.
    pub fn encode_example(&self, row: usize, example: &Example) -> Result<Antecedents> {
        self.check_example(row, example)?;
        let labels = self
            .variables
            .iter()
            .zip(&example.values)
            .map(|(variable, value)| {
                variable
                    .best_label(value)
                    .ok_or_else(|| FuzzyChiError::UnknownCategory {
                        variable: variable.name().to_string(),
                        value: format!("{:?}", value),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(Antecedents::new(labels))
    }

    /// Rejects antecedent vectors that do not fit the variables.
    pub fn check_antecedents(&self, antecedents: &Antecedents) -> Result<()> {
        if antecedents.len() != self.num_variables() {
            return Err(FuzzyChiError::DimensionMismatch {
                row: 0,
                expected: self.num_variables(),
                found: antecedents.len(),
            });
        }
        for (variable, &label) in self.variables.iter().zip(antecedents.iter()) {
            if label >= variable.label_count() {
                return Err(FuzzyChiError::LabelOutOfRange {
                    variable: variable.name().to_string(),
                    label,
                    count: variable.label_count(),
                });
            }
        }
        Ok(())
    }
}

fn most_frequent(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class_index, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class_index;
        }
    }
    best
}

impl fmt::Display for DataBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for variable in &self.variables {
            write!(f, "{}", variable)?;
        }
        writeln!(f, "Classes: {{{}}}", self.class_labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_base::{FuzzyVariable, NominalVariable};

    fn toy_data_base() -> DataBase {
        DataBase::new(
            vec![
                Variable::Fuzzy(FuzzyVariable::uniform("x", 0.0, 1.0, 3).unwrap()),
                Variable::Nominal(NominalVariable::new("colour", vec!["red".into(), "blue".into()])),
            ],
            vec!["A".into(), "B".into(), "C".into()],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_most_frequent_class_ties_go_to_lowest_index() {
        let training: Dataset = vec![
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 2),
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 1),
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 2),
            Example::new(vec![Value::Numeric(0.0), Value::Nominal(0)], 1),
        ]
        .into_iter()
        .collect();
        let db = toy_data_base().with_class_distribution(&training);
        assert_eq!(db.class_counts(), &[0, 2, 2]);
        assert_eq!(db.most_frequent_class(), 1);
    }

    #[test]
    fn test_encode_example() {
        let db = toy_data_base();
        let example = Example::new(vec![Value::Numeric(0.9), Value::Nominal(1)], 0);
        let antecedents = db.encode_example(0, &example).unwrap();
        assert_eq!(antecedents.as_slice(), &[2, 1]);
    }

    #[test]
    fn test_encode_rejects_short_rows() {
        let db = toy_data_base();
        let example = Example::new(vec![Value::Numeric(0.9)], 0);
        match db.encode_example(7, &example) {
            Err(FuzzyChiError::DimensionMismatch { row, expected, found }) => {
                assert_eq!((row, expected, found), (7, 2, 1));
            }
            other => panic!("Expected a dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_check_antecedents_label_range() {
        let db = toy_data_base();
        assert!(db.check_antecedents(&Antecedents::new(vec![2, 1])).is_ok());
        assert!(db.check_antecedents(&Antecedents::new(vec![3, 1])).is_err());
        assert!(db.check_antecedents(&Antecedents::new(vec![0, 2])).is_err());
    }
}
