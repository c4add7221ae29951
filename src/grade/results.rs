#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    constants::GRADE_THRESHOLDS,
    error::{GradingError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
/// A grade on the German school scale, 1 (best) through 6 (worst).
pub struct SchoolGrade(u8);

impl SchoolGrade {
    /// The best possible grade.
    pub const BEST: SchoolGrade = SchoolGrade(1);
    /// The worst possible grade.
    pub const WORST: SchoolGrade = SchoolGrade(6);

    /// Creates a grade, rejecting anything outside 1..=6.
    pub fn new(value: u8) -> Result<Self> {
        if (1..=6).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GradingError::input_range(format!(
                "School grade must be between 1 and 6, got {value}"
            )))
        }
    }

    /// Maps a percentage onto the scale using inclusive lower bounds.
    pub fn from_percentage(percentage: f64) -> Self {
        GRADE_THRESHOLDS
            .iter()
            .find(|(bound, _)| percentage >= *bound)
            .map(|(_, grade)| Self(*grade))
            .unwrap_or(Self::WORST)
    }

    /// Returns the numeric grade.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SchoolGrade {
    type Error = GradingError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SchoolGrade> for u8 {
    fn from(grade: SchoolGrade) -> Self {
        grade.0
    }
}

impl Display for SchoolGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_grades_outside_the_scale() {
        assert!(SchoolGrade::new(0).is_err());
        assert!(SchoolGrade::new(7).is_err());
        assert_eq!(SchoolGrade::new(6).unwrap(), SchoolGrade::WORST);
        assert!(serde_json::from_str::<SchoolGrade>("7").is_err());
        assert_eq!(serde_json::to_string(&SchoolGrade::BEST).unwrap(), "1");
    }

    #[test]
    fn percentages_below_thirty_fail() {
        assert_eq!(SchoolGrade::from_percentage(29.99).value(), 6);
        assert_eq!(SchoolGrade::from_percentage(-5.0), SchoolGrade::WORST);
        assert_eq!(SchoolGrade::from_percentage(92.0), SchoolGrade::BEST);
    }
}
