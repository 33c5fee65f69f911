#![allow(dead_code)]
use std::path::{Path, PathBuf};

use fuzzy_chi_ga::data_base::{
    parse_dataset, parse_header, DataBase, Dataset, Example, FuzzyVariable, NominalVariable, Value, Variable,
};
use lazy_static::lazy_static;
use rstest::fixture;

// TWO BINARY NOMINAL VARIABLES
// (0,0) -> A, (0,1) -> B, (1,0) -> A, (1,1) -> B

#[fixture]
pub fn binary_data_base() -> DataBase {
    DataBase::new(
        vec![
            Variable::Nominal(NominalVariable::new("first", vec!["0".into(), "1".into()])),
            Variable::Nominal(NominalVariable::new("second", vec!["0".into(), "1".into()])),
        ],
        vec!["A".into(), "B".into()],
        3,
    )
    .expect("Binary data base should be valid")
}

pub fn binary_row(first: usize, second: usize, class_index: usize) -> Example {
    Example::new(vec![Value::Nominal(first), Value::Nominal(second)], class_index)
}

#[fixture]
pub fn binary_dataset() -> Dataset {
    vec![
        binary_row(0, 0, 0),
        binary_row(0, 1, 1),
        binary_row(1, 0, 0),
        binary_row(1, 1, 1),
    ]
    .into_iter()
    .collect()
}

// ONE FUZZY VARIABLE ON [0, 1] WITH 3 LABELS

#[fixture]
pub fn single_fuzzy_data_base() -> DataBase {
    DataBase::new(
        vec![Variable::Fuzzy(
            FuzzyVariable::uniform("x", 0.0, 1.0, 3).expect("Partition should be valid"),
        )],
        vec!["A".into(), "B".into()],
        3,
    )
    .expect("Fuzzy data base should be valid")
}

// Both rows fall on label L_0 (best labels 0.0 -> L_0, 0.2 -> L_0) with different classes.
#[fixture]
pub fn conflicting_dataset() -> Dataset {
    vec![
        Example::new(vec![Value::Numeric(0.0)], 0),
        Example::new(vec![Value::Numeric(0.2)], 1),
    ]
    .into_iter()
    .collect()
}

// TWO FUZZY VARIABLES, KEEL FORMAT
// Class "high" when x + y > 1, with a few mislabeled rows.

pub const NOISY_HEADER: &str = "@relation noisy_diagonal
@attribute x real [0.0, 1.0]
@attribute y real [0.0, 1.0]
@attribute class {low, high}
@inputs x, y
@outputs class
@data
";

pub const NOISY_ROWS: &[(f64, f64, &str)] = &[
    (0.05, 0.10, "low"),
    (0.15, 0.40, "low"),
    (0.30, 0.20, "low"),
    (0.45, 0.35, "low"),
    (0.10, 0.75, "low"),
    (0.60, 0.15, "low"),
    (0.20, 0.55, "high"),
    (0.35, 0.50, "low"),
    (0.80, 0.05, "low"),
    (0.40, 0.45, "low"),
    (0.95, 0.90, "high"),
    (0.70, 0.80, "high"),
    (0.85, 0.45, "high"),
    (0.55, 0.65, "high"),
    (0.30, 0.90, "high"),
    (0.65, 0.60, "high"),
    (0.90, 0.30, "high"),
    (0.75, 0.20, "low"),
    (0.50, 0.95, "high"),
    (0.60, 0.50, "low"),
];

lazy_static! {
    static ref NOISY_KEEL_TEXT: String = NOISY_ROWS
        .iter()
        .fold(NOISY_HEADER.to_string(), |mut text, (x, y, class)| {
            text.push_str(&format!("{}, {}, {}\n", x, y, class));
            text
        });
}

pub fn noisy_keel_text() -> &'static str {
    NOISY_KEEL_TEXT.as_str()
}

#[fixture]
pub fn noisy_data_base() -> DataBase {
    let data_base = parse_header(noisy_keel_text().as_bytes(), 3).expect("Header should parse");
    let training = parse_dataset(noisy_keel_text().as_bytes(), &data_base).expect("Rows should parse");
    data_base.with_class_distribution(&training)
}

#[fixture]
pub fn noisy_dataset(noisy_data_base: DataBase) -> Dataset {
    parse_dataset(noisy_keel_text().as_bytes(), &noisy_data_base).expect("Rows should parse")
}

/// Writes training and test files into `dir`.
pub fn write_noisy_files(dir: &Path) -> (PathBuf, PathBuf) {
    let training = dir.join("noisy-tra.dat");
    let test = dir.join("noisy-tst.dat");
    std::fs::write(&training, noisy_keel_text()).expect("Training file should be written");

    let mut test_text = NOISY_HEADER.to_string();
    for (x, y, class) in NOISY_ROWS.iter().step_by(3) {
        test_text.push_str(&format!("{}, {}, {}\n", y, x, class));
    }
    std::fs::write(&test, test_text).expect("Test file should be written");
    (training, test)
}
