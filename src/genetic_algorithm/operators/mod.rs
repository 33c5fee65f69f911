mod crossover;
mod selection;
mod survival;

pub use crossover::{Crossover, HuxCrossover};

pub use selection::IncestPrevention;

pub use survival::{SurvivorSelector, TruncationSurvival};
