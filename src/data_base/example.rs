use super::Value;

/// A decoded row: one value per input variable plus the class index.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub values: Vec<Value>,
    pub class_index: usize,
}

impl Example {
    pub fn new(values: Vec<Value>, class_index: usize) -> Self {
        Self { values, class_index }
    }
}

/// Fully materialised set of examples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    examples: Vec<Example>,
}

impl Dataset {
    pub fn new(examples: Vec<Example>) -> Self {
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Example> {
        self.examples.get(index)
    }

    /// Number of examples of each class, indexed by class.
    pub fn class_distribution(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_classes];
        for example in &self.examples {
            if let Some(count) = counts.get_mut(example.class_index) {
                *count += 1;
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

impl FromIterator<Example> for Dataset {
    fn from_iter<I: IntoIterator<Item = Example>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
