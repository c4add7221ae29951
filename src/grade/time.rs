#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// A grade attached to a time boundary.
///
/// Numeric grades (and labels that parse as numbers) are interpolated; other
/// labels snap to the closer boundary.
pub enum BoundaryGrade {
    /// A numeric grade such as `1` or `2.5`.
    Number(f64),
    /// A free-form label such as `"sehr gut"`.
    Label(String),
}

impl BoundaryGrade {
    /// Returns the grade as a number, parsing labels when possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Label(label) => label.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }
}

impl From<f64> for BoundaryGrade {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for BoundaryGrade {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for BoundaryGrade {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl Display for BoundaryGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(label) => write!(f, "{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A time in seconds paired with the grade awarded at exactly that time.
pub struct TimeBoundary {
    /// Seconds, non-negative.
    pub time:  f64,
    /// Grade at `time`.
    pub grade: BoundaryGrade,
}

impl TimeBoundary {
    /// Creates a boundary.
    pub fn new(time: f64, grade: impl Into<BoundaryGrade>) -> Self {
        Self {
            time,
            grade: grade.into(),
        }
    }
}

/// Serde default for `linear_mapping`.
fn default_linear_mapping() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Configuration for grading a measured time.
///
/// Boundaries may be stored in any order; they are sorted by time before
/// grading.
pub struct TimeGradingConfig {
    /// Grade for the fastest time.
    #[builder(into)]
    pub best_grade:            BoundaryGrade,
    /// Grade for the slowest time.
    #[builder(into)]
    pub worst_grade:           BoundaryGrade,
    /// Whether grades are interpolated linearly. Nothing else is supported.
    #[builder(default = true)]
    #[serde(default = "default_linear_mapping")]
    pub linear_mapping:        bool,
    /// Whether boundaries may be tweaked after a session was graded.
    #[builder(default)]
    #[serde(default)]
    pub adjustable_afterwards: bool,
    /// Time/grade pairs. Required for grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_boundaries:     Option<Vec<TimeBoundary>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The outcome of grading one time.
pub struct TimeGrade {
    /// Interpolated or boundary grade.
    pub grade:           BoundaryGrade,
    /// The measured time.
    pub time_in_seconds: f64,
    /// Time of the first boundary after sorting.
    pub best_time:       f64,
    /// Time of the last boundary after sorting.
    pub worst_time:      f64,
}

#[derive(Debug, Clone, Default, PartialEq, Builder)]
/// Changes to apply to the outermost boundaries of a [`TimeGradingConfig`].
/// Unset fields are left alone.
pub struct BoundaryAdjustment {
    /// New time of the best boundary.
    pub best_time:   Option<f64>,
    /// New time of the worst boundary.
    pub worst_time:  Option<f64>,
    /// New grade of the best boundary.
    #[builder(into)]
    pub best_grade:  Option<BoundaryGrade>,
    /// New grade of the worst boundary.
    #[builder(into)]
    pub worst_grade: Option<BoundaryGrade>,
}

#[derive(Debug, Clone, Copy, Default)]
/// Maps a measured time to a grade by piecewise-linear interpolation across
/// configured boundaries.
pub struct TimeGrader;

impl TimeGrader {
    /// Creates a time grader.
    pub fn new() -> Self {
        Self
    }

    /// Checks that `config` can be graded without grading anything.
    pub fn validate_config(&self, config: &TimeGradingConfig) -> Result<()> {
        sorted_boundaries(config).map(|_| ())
    }

    /// Grades `time_in_seconds` against `config`.
    pub fn calculate_grade(
        &self,
        time_in_seconds: f64,
        config: &TimeGradingConfig,
    ) -> Result<TimeGrade> {
        let boundaries = sorted_boundaries(config)?;

        if !time_in_seconds.is_finite() || time_in_seconds < 0.0 {
            return Err(GradingError::input_range(format!(
                "Time must be a non-negative number of seconds, got {time_in_seconds}"
            )));
        }

        // `sorted_boundaries` guarantees at least two entries.
        let first = &boundaries[0];
        let last = &boundaries[boundaries.len() - 1];

        let grade = if time_in_seconds <= first.time {
            first.grade.clone()
        } else if time_in_seconds >= last.time {
            last.grade.clone()
        } else {
            let (lower, upper) = boundaries
                .iter()
                .tuple_windows()
                .find(|(lower, upper)| lower.time <= time_in_seconds && time_in_seconds <= upper.time)
                .ok_or_else(|| {
                    GradingError::configuration(format!(
                        "No boundary pair brackets {time_in_seconds}s"
                    ))
                })?;
            interpolate(lower, upper, time_in_seconds)
        };

        tracing::debug!("Graded {time_in_seconds}s as {grade}");

        Ok(TimeGrade {
            grade,
            time_in_seconds,
            best_time: first.time,
            worst_time: last.time,
        })
    }

    /// Returns a copy of `config` with the best and/or worst boundary moved.
    ///
    /// When `config` has no boundaries yet, a two-point set is synthesised
    /// from the adjustment, which must then carry both times. The result is
    /// validated like any config handed to [`TimeGrader::calculate_grade`];
    /// moved ends may not cross each other or an inner boundary.
    pub fn adjust_boundaries(
        &self,
        config: &TimeGradingConfig,
        adjustment: &BoundaryAdjustment,
    ) -> Result<TimeGradingConfig> {
        let mut adjusted = config.clone();

        let boundaries = match config.custom_boundaries.as_deref() {
            Some(existing) if !existing.is_empty() => {
                let mut boundaries = existing
                    .iter()
                    .cloned()
                    .sorted_by(|a, b| a.time.total_cmp(&b.time))
                    .collect_vec();

                let best = &mut boundaries[0];
                if let Some(time) = adjustment.best_time {
                    best.time = time;
                }
                if let Some(grade) = &adjustment.best_grade {
                    best.grade = grade.clone();
                }

                let last = boundaries.len() - 1;
                let worst = &mut boundaries[last];
                if let Some(time) = adjustment.worst_time {
                    worst.time = time;
                }
                if let Some(grade) = &adjustment.worst_grade {
                    worst.grade = grade.clone();
                }

                let (best_time, worst_time) = (boundaries[0].time, boundaries[last].time);
                if last > 0 && best_time >= worst_time {
                    return Err(GradingError::configuration(format!(
                        "Best time ({best_time}s) must be less than worst time ({worst_time}s)"
                    )));
                }
                // Moved ends must not pass an inner boundary.
                if boundaries
                    .iter()
                    .tuple_windows()
                    .any(|(a, b)| a.time >= b.time)
                {
                    return Err(GradingError::configuration(
                        "Adjusted boundary times must stay in increasing order",
                    ));
                }
                boundaries
            }
            _ => {
                let (Some(best_time), Some(worst_time)) =
                    (adjustment.best_time, adjustment.worst_time)
                else {
                    return Err(GradingError::configuration(
                        "Both best and worst time are required when no boundaries exist",
                    ));
                };
                if best_time >= worst_time {
                    return Err(GradingError::configuration(format!(
                        "Best time ({best_time}s) must be less than worst time ({worst_time}s)"
                    )));
                }

                vec![
                    TimeBoundary::new(
                        best_time,
                        adjustment
                            .best_grade
                            .clone()
                            .unwrap_or_else(|| config.best_grade.clone()),
                    ),
                    TimeBoundary::new(
                        worst_time,
                        adjustment
                            .worst_grade
                            .clone()
                            .unwrap_or_else(|| config.worst_grade.clone()),
                    ),
                ]
            }
        };

        if let Some(grade) = &adjustment.best_grade {
            adjusted.best_grade = grade.clone();
        }
        if let Some(grade) = &adjustment.worst_grade {
            adjusted.worst_grade = grade.clone();
        }
        adjusted.custom_boundaries = Some(boundaries);
        sorted_boundaries(&adjusted)?;

        Ok(adjusted)
    }

    /// Builds a linear two-point configuration from `best_time` to
    /// `worst_time`.
    pub fn create_default_config(
        &self,
        best_time: f64,
        worst_time: f64,
        best_grade: impl Into<BoundaryGrade>,
        worst_grade: impl Into<BoundaryGrade>,
    ) -> Result<TimeGradingConfig> {
        if !best_time.is_finite() || !worst_time.is_finite() || best_time < 0.0 {
            return Err(GradingError::configuration(format!(
                "Times must be non-negative numbers, got {best_time}s and {worst_time}s"
            )));
        }
        if best_time >= worst_time {
            return Err(GradingError::configuration(format!(
                "Best time ({best_time}s) must be less than worst time ({worst_time}s)"
            )));
        }

        let best_grade = best_grade.into();
        let worst_grade = worst_grade.into();

        Ok(TimeGradingConfig {
            custom_boundaries: Some(vec![
                TimeBoundary::new(best_time, best_grade.clone()),
                TimeBoundary::new(worst_time, worst_grade.clone()),
            ]),
            best_grade,
            worst_grade,
            linear_mapping: true,
            adjustable_afterwards: true,
        })
    }
}

/// Validates `config` and returns its boundaries sorted by time.
fn sorted_boundaries(config: &TimeGradingConfig) -> Result<Vec<TimeBoundary>> {
    if !config.linear_mapping {
        return Err(GradingError::configuration(
            "Only linear time mapping is supported",
        ));
    }

    let Some(boundaries) = config.custom_boundaries.as_deref() else {
        return Err(GradingError::configuration(
            "Time grading requires custom boundaries",
        ));
    };
    if boundaries.len() < 2 {
        return Err(GradingError::configuration(format!(
            "At least 2 time boundaries are required, got {}",
            boundaries.len()
        )));
    }
    if let Some(bad) = boundaries
        .iter()
        .find(|b| !b.time.is_finite() || b.time < 0.0)
    {
        return Err(GradingError::configuration(format!(
            "Boundary times must be non-negative, got {}",
            bad.time
        )));
    }

    let sorted = boundaries
        .iter()
        .cloned()
        .sorted_by(|a, b| a.time.total_cmp(&b.time))
        .collect_vec();

    if let Some((dup, _)) = sorted.iter().tuple_windows().find(|(a, b)| a.time == b.time) {
        return Err(GradingError::configuration(format!(
            "Boundary times must be unique, {}s appears more than once",
            dup.time
        )));
    }

    Ok(sorted)
}

/// Grade between two bracketing boundaries.
fn interpolate(lower: &TimeBoundary, upper: &TimeBoundary, time: f64) -> BoundaryGrade {
    let ratio = (time - lower.time) / (upper.time - lower.time);

    match (lower.grade.as_number(), upper.grade.as_number()) {
        (Some(low), Some(high)) => BoundaryGrade::Number(low + ratio * (high - low)),
        // Labels cannot be interpolated, snap to the closer one.
        _ if ratio < 0.5 => lower.grade.clone(),
        _ => upper.grade.clone(),
    }
}
