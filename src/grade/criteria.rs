#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashMap;

use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::results::SchoolGrade;
use crate::{
    constants::{MAX_CRITERIA, MAX_SCORE, MIN_SCORE},
    error::{GradingError, Result},
    util::round2,
};

/// Default upper bound of a criterion slider, used by serde.
fn default_max_value() -> f64 {
    MAX_SCORE
}

/// Default criterion weight, used by serde.
fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
/// A named, weighted scoring dimension.
pub struct Criterion {
    /// Identifier scores refer to.
    pub id:        String,
    /// Display name, unique within a set (case-insensitive).
    pub name:      String,
    /// Relative weight, normalised against the sum of all weights.
    #[builder(default = 1.0)]
    #[serde(default = "default_weight")]
    pub weight:    f64,
    /// Lowest value of the slider.
    #[builder(default = MIN_SCORE)]
    #[serde(default)]
    pub min_value: f64,
    /// Highest value of the slider.
    #[builder(default = MAX_SCORE)]
    #[serde(default = "default_max_value")]
    pub max_value: f64,
}

impl Criterion {
    /// Creates a criterion on the default 0–100 slider.
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            min_value: MIN_SCORE,
            max_value: MAX_SCORE,
        }
    }

    /// Maps `score` onto 0–100 relative to this criterion's slider span.
    fn normalize(&self, score: f64) -> f64 {
        let span = self.max_value - self.min_value;
        if span > 0.0 {
            round2((score - self.min_value) / span * 100.0)
        } else {
            score
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The slider value a student received for one criterion.
pub struct CriteriaScore {
    /// The criterion this score belongs to.
    pub criterion_id: String,
    /// Slider value, 0–100.
    pub value:        f64,
}

impl CriteriaScore {
    /// Creates a score for `criterion_id`.
    pub fn new(criterion_id: impl Into<String>, value: f64) -> Self {
        Self {
            criterion_id: criterion_id.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// How a single criterion contributed to a weighted grade.
pub struct CriterionBreakdown {
    #[tabled(skip)]
    /// * `criterion_id`: the criterion identifier
    pub criterion_id:     String,
    #[tabled(rename = "Criterion")]
    /// * `criterion_name`: the criterion name
    pub criterion_name:   String,
    #[tabled(rename = "Score")]
    /// * `score`: the raw slider value
    pub score:            f64,
    #[tabled(rename = "Weight")]
    /// * `weight`: the criterion's configured weight
    pub weight:           f64,
    #[tabled(rename = "Weighted")]
    /// * `weighted_score`: score times normalised weight, rounded to 2 places
    pub weighted_score:   f64,
    #[tabled(rename = "Normalized")]
    /// * `normalized_score`: score relative to the slider span, 0–100
    pub normalized_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The outcome of criteria-weighted grading.
pub struct WeightedGrade {
    /// Ordinal grade.
    pub value:                SchoolGrade,
    /// Grade for display.
    pub display_value:        String,
    /// Overall percentage, equal to the total weighted score.
    pub percentage:           f64,
    /// Per-criterion contributions, in criteria order.
    pub breakdown:            Vec<CriterionBreakdown>,
    /// Sum of weighted scores, rounded to 2 places.
    pub total_weighted_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Non-throwing report produced by [`CriteriaGrader::validate_criteria`].
pub struct CriteriaValidation {
    /// True when `errors` is empty.
    pub valid:  bool,
    /// Human-readable problems, in detection order.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Builder)]
/// Converts slider scores and per-criterion weights into one percentage and a
/// school grade.
pub struct CriteriaGrader {
    /// Largest criteria set this grader accepts.
    #[builder(default = MAX_CRITERIA)]
    max_criteria: usize,
}

impl Default for CriteriaGrader {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CriteriaGrader {
    /// Creates a grader with the default criteria limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the largest criteria set this grader accepts.
    pub fn max_criteria(&self) -> usize {
        self.max_criteria
    }

    /// Grades `scores` against `criteria`.
    ///
    /// Scores for unknown criteria are ignored; if a criterion is scored more
    /// than once the first score is used.
    pub fn calculate_grade(
        &self,
        criteria: &[Criterion],
        scores: &[CriteriaScore],
    ) -> Result<WeightedGrade> {
        if criteria.is_empty() {
            return Err(GradingError::configuration("At least one criterion is required"));
        }
        if criteria.len() > self.max_criteria {
            return Err(GradingError::configuration(format!(
                "A maximum of {} criteria is allowed, got {}",
                self.max_criteria,
                criteria.len()
            )));
        }
        if scores.is_empty() {
            return Err(GradingError::input_range("At least one score is required"));
        }
        if let Some(bad) = scores
            .iter()
            .find(|s| !(MIN_SCORE..=MAX_SCORE).contains(&s.value))
        {
            return Err(GradingError::input_range(format!(
                "Score for criterion {} must be between {MIN_SCORE} and {MAX_SCORE}, got {}",
                bad.criterion_id, bad.value
            )));
        }

        let mut by_id: HashMap<&str, f64> = HashMap::with_capacity(scores.len());
        for score in scores {
            by_id.entry(score.criterion_id.as_str()).or_insert(score.value);
        }

        let matched = criteria
            .iter()
            .map(|criterion| {
                by_id
                    .get(criterion.id.as_str())
                    .map(|value| (criterion, *value))
                    .ok_or_else(|| {
                        GradingError::input_range(format!(
                            "Missing score for criterion: {}",
                            criterion.name
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(negative) = criteria.iter().find(|c| c.weight < 0.0) {
            return Err(GradingError::configuration(format!(
                "Criterion {} has a negative weight",
                negative.name
            )));
        }
        let total_weight: f64 = criteria.iter().map(|c| c.weight).sum();
        if total_weight.is_nan() || total_weight <= 0.0 {
            return Err(GradingError::configuration(
                "Total weight of criteria must be greater than 0",
            ));
        }

        let mut sum = 0.0;
        let breakdown = matched
            .into_iter()
            .map(|(criterion, score)| {
                let weighted = score * (criterion.weight / total_weight);
                sum += weighted;
                CriterionBreakdown {
                    criterion_id:     criterion.id.clone(),
                    criterion_name:   criterion.name.clone(),
                    score,
                    weight:           criterion.weight,
                    weighted_score:   round2(weighted),
                    normalized_score: criterion.normalize(score),
                }
            })
            .collect_vec();

        let total_weighted_score = round2(sum);
        let value = SchoolGrade::from_percentage(total_weighted_score);
        tracing::debug!(
            "Weighted {} criteria to {total_weighted_score}% (grade {value})",
            criteria.len()
        );

        Ok(WeightedGrade {
            value,
            display_value: value.to_string(),
            percentage: total_weighted_score,
            breakdown,
            total_weighted_score,
        })
    }

    /// Returns copies of `criteria` with weights replaced by those present in
    /// `new_weights`, keyed by criterion id.
    pub fn update_weights(
        &self,
        criteria: &[Criterion],
        new_weights: &HashMap<String, f64>,
    ) -> Result<Vec<Criterion>> {
        if let Some((id, weight)) = new_weights.iter().find(|(_, w)| **w < 0.0) {
            return Err(GradingError::configuration(format!(
                "Weight for criterion {id} must not be negative, got {weight}"
            )));
        }

        let updated = criteria
            .iter()
            .map(|criterion| Criterion {
                weight: new_weights
                    .get(&criterion.id)
                    .copied()
                    .unwrap_or(criterion.weight),
                ..criterion.clone()
            })
            .collect_vec();

        if updated.iter().map(|c| c.weight).sum::<f64>() <= 0.0 {
            return Err(GradingError::configuration(
                "Total weight of criteria must be greater than 0",
            ));
        }

        Ok(updated)
    }

    /// Reports every problem with `criteria` without failing.
    pub fn validate_criteria(&self, criteria: &[Criterion]) -> CriteriaValidation {
        let mut errors = Vec::new();

        if criteria.is_empty() {
            errors.push("At least one criterion is required".to_string());
        }
        if criteria.len() > self.max_criteria {
            errors.push(format!(
                "A maximum of {} criteria is allowed, got {}",
                self.max_criteria,
                criteria.len()
            ));
        }
        if !criteria.is_empty() && criteria.iter().map(|c| c.weight).sum::<f64>() <= 0.0 {
            errors.push("Total weight of criteria must be greater than 0".to_string());
        }

        for (index, criterion) in criteria.iter().enumerate() {
            if criterion.name.trim().is_empty() {
                errors.push(format!("Criterion {} has no name", index + 1));
            }
            if criterion.weight < 0.0 {
                errors.push(format!(
                    "Criterion {} has a negative weight",
                    display_name(criterion, index)
                ));
            }
        }

        let duplicates = criteria
            .iter()
            .map(|c| c.name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .duplicates()
            .collect_vec();
        if !duplicates.is_empty() {
            errors.push(format!("Duplicate criterion names found: {}", duplicates.join(", ")));
        }

        CriteriaValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Name to use in messages, falling back to the 1-based position.
fn display_name(criterion: &Criterion, index: usize) -> String {
    if criterion.name.trim().is_empty() {
        format!("#{}", index + 1)
    } else {
        criterion.name.clone()
    }
}
