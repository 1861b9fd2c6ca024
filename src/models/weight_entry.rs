use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single body-weight measurement in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub weight: f64,
}

impl fmt::Display for WeightEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.1} kg", self.date, self.weight)
    }
}
