//! Domain models for the dental chart.

mod chart;
mod odontogram;

pub use chart::*;
pub use odontogram::*;
