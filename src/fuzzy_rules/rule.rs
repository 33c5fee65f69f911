use std::fmt;

use crate::data_base::DataBase;

/// Label index per variable. Used as the deduplication key of candidate rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Antecedents(Vec<usize>);

impl Antecedents {
    pub fn new(labels: Vec<usize>) -> Self {
        Self(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Antecedents {
    fn from(labels: Vec<usize>) -> Self {
        Self::new(labels)
    }
}

/// `IF x1 IS A1 AND ... THEN CLASS = c WITH RW = w`
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    antecedents: Antecedents,
    class_index: usize,
    weight: f64,
}

impl FuzzyRule {
    pub fn new(antecedents: Antecedents, class_index: usize, weight: f64) -> Self {
        Self {
            antecedents,
            class_index,
            weight,
        }
    }

    pub fn antecedents(&self) -> &Antecedents {
        &self.antecedents
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Pairs the rule with the data base that names its labels and classes.
    pub fn display<'a>(&'a self, data_base: &'a DataBase) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            data_base,
        }
    }
}

pub struct RuleDisplay<'a> {
    rule: &'a FuzzyRule,
    data_base: &'a DataBase,
}

impl fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF ")?;
        for (position, &label) in self.rule.antecedents.iter().enumerate() {
            if position > 0 {
                write!(f, " AND ")?;
            }
            match self.data_base.variable(position) {
                Some(variable) => write!(f, "{} IS {}", variable.name(), variable.label_name(label))?,
                None => write!(f, "X{} IS L_{}", position, label)?,
            }
        }
        let class_label = self
            .data_base
            .class_label(self.rule.class_index)
            .unwrap_or("?");
        write!(f, " THEN CLASS = {} WITH RW = {}", class_label, self.rule.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_base::{FuzzyVariable, NominalVariable, Variable};
    use std::collections::HashMap;

    #[test]
    fn test_antecedents_as_map_key() {
        let mut map: HashMap<Antecedents, usize> = HashMap::new();
        map.insert(Antecedents::new(vec![0, 1, 2]), 1);
        *map.entry(Antecedents::new(vec![0, 1, 2])).or_insert(0) += 1;
        map.insert(Antecedents::new(vec![0, 1, 3]), 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Antecedents::from(vec![0, 1, 2])], 2);
    }

    #[test]
    fn test_rule_display() {
        let db = DataBase::new(
            vec![
                Variable::Fuzzy(FuzzyVariable::uniform("width", 0.0, 1.0, 3).unwrap()),
                Variable::Nominal(NominalVariable::new("shape", vec!["round".into(), "flat".into()])),
            ],
            vec!["yes".into(), "no".into()],
            3,
        )
        .unwrap();
        let rule = FuzzyRule::new(Antecedents::new(vec![2, 1]), 1, 0.5);
        assert_eq!(
            rule.display(&db).to_string(),
            "IF width IS L_2 AND shape IS flat THEN CLASS = no WITH RW = 0.5"
        );
    }
}
