#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_OUTLIER_THRESHOLD, DEFAULT_RISK_THRESHOLD, DEFAULT_TARGET_DIFFICULTY},
    error::{GradingError, Result},
    grade::{
        CriteriaGrader, CriteriaScore, Criterion, Discipline, TableDefinition, TableGrader,
        TableScore, TimeGrade, TimeGrader, TimeGradingConfig, WeightedGrade, validate_table,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// A persisted grading configuration, tagged by the strategy it selects.
pub enum GradingConfig {
    /// Weighted slider criteria.
    Criteria {
        /// The criteria set.
        criteria: Vec<Criterion>,
    },
    /// Linear time interpolation.
    Time(TimeGradingConfig),
    /// Multi-discipline table lookup.
    Table {
        /// Disciplines to score.
        disciplines: Vec<Discipline>,
        /// The scoring table.
        table:       TableDefinition,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// Raw measurements to be graded.
pub enum Measurement {
    /// Slider scores for a criteria configuration.
    Scores {
        /// One score per criterion.
        scores: Vec<CriteriaScore>,
    },
    /// A measured time for a time configuration.
    Time {
        /// Elapsed seconds.
        seconds: f64,
    },
    /// Performances for a table configuration.
    Performances {
        /// Performance per discipline id.
        performances: HashMap<String, f64>,
        /// Values for the table's context dimensions.
        #[serde(default)]
        context:      HashMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// The result of grading a [`Measurement`] against a [`GradingConfig`].
pub enum Outcome {
    /// From a criteria configuration.
    Criteria(WeightedGrade),
    /// From a time configuration.
    Time(TimeGrade),
    /// From a table configuration.
    Table(TableScore),
}

impl GradingConfig {
    /// Parses a configuration from its persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            GradingError::configuration(format!("Could not parse grading configuration: {e}"))
        })
    }

    /// The `type` tag of this configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Criteria { .. } => "criteria",
            Self::Time(_) => "time",
            Self::Table { .. } => "table",
        }
    }

    /// Checks the configuration without grading anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Criteria { criteria } => {
                let report = CriteriaGrader::default().validate_criteria(criteria);
                if report.valid {
                    Ok(())
                } else {
                    Err(GradingError::configuration(report.errors.join("; ")))
                }
            }
            Self::Time(config) => TimeGrader.validate_config(config),
            Self::Table { table, .. } => validate_table(table),
        }
    }

    /// Grades `measurement` with the strategy this configuration selects.
    pub fn grade(&self, measurement: &Measurement) -> Result<Outcome> {
        match (self, measurement) {
            (Self::Criteria { criteria }, Measurement::Scores { scores }) => {
                CriteriaGrader::default()
                    .calculate_grade(criteria, scores)
                    .map(Outcome::Criteria)
            }
            (Self::Time(config), Measurement::Time { seconds }) => {
                TimeGrader.calculate_grade(*seconds, config).map(Outcome::Time)
            }
            (
                Self::Table { disciplines, table },
                Measurement::Performances {
                    performances,
                    context,
                },
            ) => TableGrader::default()
                .calculate_score(disciplines, performances, table, context)
                .map(Outcome::Table),
            (config, measurement) => Err(GradingError::configuration(format!(
                "A {} configuration cannot grade {} measurements",
                config.kind(),
                measurement.kind()
            ))),
        }
    }
}

impl Measurement {
    /// The `kind` tag of this measurement.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scores { .. } => "scores",
            Self::Time { .. } => "time",
            Self::Performances { .. } => "performances",
        }
    }

    /// Parses a measurement from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            GradingError::input_range(format!("Could not parse measurement: {e}"))
        })
    }
}

/// Analysis defaults, overridable through the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Difficulty index point adjustments aim for.
    target_difficulty: f64,
    /// Percentage below which students are at risk.
    risk_threshold:    f64,
    /// Distance from the mean difficulty that makes a task an outlier.
    outlier_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_difficulty: DEFAULT_TARGET_DIFFICULTY,
            risk_threshold:    DEFAULT_RISK_THRESHOLD,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

impl Settings {
    /// Reads `NOTENWERK_TARGET_DIFFICULTY`, `NOTENWERK_RISK_THRESHOLD` and
    /// `NOTENWERK_OUTLIER_THRESHOLD`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Settings::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            target_difficulty: read_number(
                &lookup,
                "NOTENWERK_TARGET_DIFFICULTY",
                defaults.target_difficulty,
            ),
            risk_threshold:    read_number(
                &lookup,
                "NOTENWERK_RISK_THRESHOLD",
                defaults.risk_threshold,
            ),
            outlier_threshold: read_number(
                &lookup,
                "NOTENWERK_OUTLIER_THRESHOLD",
                defaults.outlier_threshold,
            ),
        }
    }

    /// Returns the target difficulty index.
    pub fn target_difficulty(&self) -> f64 {
        self.target_difficulty
    }

    /// Returns the risk threshold in percent.
    pub fn risk_threshold(&self) -> f64 {
        self.risk_threshold
    }

    /// Returns the outlier threshold.
    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    /// Overrides the target difficulty index.
    pub fn set_target_difficulty(mut self, value: f64) -> Self {
        self.target_difficulty = value;
        self
    }

    /// Overrides the risk threshold.
    pub fn set_risk_threshold(mut self, value: f64) -> Self {
        self.risk_threshold = value;
        self
    }

    /// Overrides the outlier threshold.
    pub fn set_outlier_threshold(mut self, value: f64) -> Self {
        self.outlier_threshold = value;
        self
    }
}

/// Reads a finite number from `name`, or `default` when unset or unparsable.
fn read_number<F>(lookup: &F, name: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                tracing::warn!("Ignoring {name}={raw:?}, expected a number; using {default}");
                default
            }
        },
    }
}
