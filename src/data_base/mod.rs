mod example;
mod keel;
mod schema;
mod variable;

pub use example::{Dataset, Example};
pub use keel::{load_data_base, load_dataset, parse_dataset, parse_header};
pub use schema::DataBase;
pub use variable::{FuzzySet, FuzzyVariable, NominalVariable, Value, Variable};
