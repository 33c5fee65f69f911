use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuzzyChiError {
    #[error("Header error (line {line}): {message}")]
    Header { line: usize, message: String },

    #[error("Data error (line {line}): {message}")]
    Data { line: usize, message: String },

    #[error("Example {row} has {found} values but the data base defines {expected} variables")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown class label: {0}")]
    UnknownClass(String),

    #[error("Unknown category '{value}' for variable {variable}")]
    UnknownCategory { variable: String, value: String },

    #[error("Label {label} is out of range for variable {variable} ({count} labels)")]
    LabelOutOfRange {
        variable: String,
        label: usize,
        count: usize,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FuzzyChiError>;
