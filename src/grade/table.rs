#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, fmt::Display};

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::{
    constants::{HONOR_CERTIFICATE_POINTS, RESERVED_TABLE_KEYS, WINNER_CERTIFICATE_POINTS},
    error::{GradingError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// What a discipline measures.
pub enum MeasurementType {
    /// Seconds, lower is better.
    Time,
    /// Metres thrown or jumped.
    Distance,
    /// Metres cleared.
    Height,
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
/// A single event of a multi-discipline competition.
pub struct Discipline {
    /// Identifier referenced by table entries as `disciplineId`.
    pub id:               String,
    /// Display name.
    pub name:             String,
    /// What the performance value measures.
    pub measurement_type: MeasurementType,
    /// Unit appended when formatting performances.
    pub unit:             String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One row of a scoring table.
///
/// `key` holds `disciplineId`, either an exact `value` or a
/// `minValue`/`maxValue` (`minTime`/`maxTime`) range, plus any number of
/// context dimensions such as `gender`. `value` holds the points.
pub struct TableEntry {
    /// Conditions the performance and context must satisfy.
    pub key:   Map<String, Value>,
    /// Points awarded on a match.
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A scoring table, searched top to bottom.
pub struct TableDefinition {
    /// Table identifier.
    pub id:      String,
    /// Rows in declaration order.
    pub entries: Vec<TableEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Certificate tier awarded for a total score.
pub enum Certificate {
    /// Top tier.
    Ehrenurkunde,
    /// Middle tier.
    Siegerurkunde,
    /// Awarded for any positive score.
    Teilnahmeurkunde,
}

impl Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ehrenurkunde => "ehrenurkunde",
            Self::Siegerurkunde => "siegerurkunde",
            Self::Teilnahmeurkunde => "teilnahmeurkunde",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Inclusive lower bounds for the certificate tiers.
pub struct CertificateThresholds {
    /// Points needed for an Ehrenurkunde.
    #[builder(default = HONOR_CERTIFICATE_POINTS)]
    pub honor:  f64,
    /// Points needed for a Siegerurkunde.
    #[builder(default = WINNER_CERTIFICATE_POINTS)]
    pub winner: f64,
}

impl Default for CertificateThresholds {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CertificateThresholds {
    /// Classifies `total_points`. Zero or fewer points earn nothing.
    pub fn classify(&self, total_points: f64) -> Option<Certificate> {
        if total_points >= self.honor {
            Some(Certificate::Ehrenurkunde)
        } else if total_points >= self.winner {
            Some(Certificate::Siegerurkunde)
        } else if total_points > 0.0 {
            Some(Certificate::Teilnahmeurkunde)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Points awarded for one discipline.
pub struct DisciplineResult {
    #[tabled(skip)]
    /// * `discipline_id`: the discipline identifier
    pub discipline_id:         String,
    #[tabled(rename = "Discipline")]
    /// * `discipline_name`: the discipline name
    pub discipline_name:       String,
    #[tabled(skip)]
    /// * `performance`: the raw performance value
    pub performance:           f64,
    #[tabled(rename = "Performance")]
    /// * `formatted_performance`: the performance with its unit
    pub formatted_performance: String,
    #[tabled(rename = "Points")]
    /// * `points`: points from the matched table entry
    pub points:                f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The outcome of scoring all disciplines.
pub struct TableScore {
    /// Sum of points over all disciplines.
    pub total_points:       f64,
    /// Per-discipline points, in discipline order.
    pub discipline_results: Vec<DisciplineResult>,
    /// Certificate tier, if any.
    pub certificate_type:   Option<Certificate>,
}

#[derive(Debug, Clone, Default, Builder)]
/// Scores several disciplines by table lookup and classifies the total into a
/// certificate tier.
///
/// When several entries match a performance, the first one in table order
/// wins. Entries are not ranked by how specific they are.
pub struct TableGrader {
    /// Certificate tier bounds.
    #[builder(default)]
    thresholds: CertificateThresholds,
}

impl TableGrader {
    /// Creates a grader with the standard certificate thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the certificate thresholds in use.
    pub fn thresholds(&self) -> CertificateThresholds {
        self.thresholds
    }

    /// Scores `performances` (keyed by discipline id) for every discipline.
    ///
    /// `context` supplies values for the table's context dimensions, e.g.
    /// `gender`.
    pub fn calculate_score(
        &self,
        disciplines: &[Discipline],
        performances: &HashMap<String, f64>,
        table: &TableDefinition,
        context: &HashMap<String, String>,
    ) -> Result<TableScore> {
        validate_table(table)?;

        let mut total_points = 0.0;
        let mut discipline_results = Vec::with_capacity(disciplines.len());

        for discipline in disciplines {
            let performance = *performances.get(&discipline.id).ok_or_else(|| {
                GradingError::input_range(format!(
                    "Performance value missing for discipline: {}",
                    discipline.id
                ))
            })?;
            if !performance.is_finite() || performance < 0.0 {
                return Err(GradingError::input_range(format!(
                    "Invalid performance value for discipline {}: {performance}",
                    discipline.id
                )));
            }

            let points = lookup_points(discipline, performance, table, context)?;
            total_points += points;

            discipline_results.push(DisciplineResult {
                discipline_id: discipline.id.clone(),
                discipline_name: discipline.name.clone(),
                performance,
                formatted_performance: format_performance(
                    performance,
                    &discipline.unit,
                    discipline.measurement_type,
                ),
                points,
            });
        }

        let certificate_type = self.thresholds.classify(total_points);
        tracing::debug!(
            "Scored {} disciplines on table {}: {total_points} points",
            disciplines.len(),
            table.id
        );

        Ok(TableScore {
            total_points,
            discipline_results,
            certificate_type,
        })
    }
}

/// Finds the first matching entry and returns its points.
fn lookup_points(
    discipline: &Discipline,
    performance: f64,
    table: &TableDefinition,
    context: &HashMap<String, String>,
) -> Result<f64> {
    let mut matches = table
        .entries
        .iter()
        .filter(|entry| entry_matches(entry, &discipline.id, performance, context));

    let Some(entry) = matches.next() else {
        return Err(GradingError::lookup(format!(
            "No table entry found for discipline {} with performance {performance}",
            discipline.id
        )));
    };

    let shadowed = matches.count();
    if shadowed > 0 {
        tracing::warn!(
            "{} more entries in table {} match discipline {} at {performance}; using the first",
            shadowed,
            table.id,
            discipline.id
        );
    }

    entry
        .value
        .as_f64()
        .filter(|points| points.is_finite())
        .ok_or_else(|| {
            GradingError::configuration(format!(
                "Points for discipline {} in table {} must be a number, got {}",
                discipline.id, table.id, entry.value
            ))
        })
}

/// Whether `entry` applies to this discipline, performance and context.
fn entry_matches(
    entry: &TableEntry,
    discipline_id: &str,
    performance: f64,
    context: &HashMap<String, String>,
) -> bool {
    let key = &entry.key;

    match key.get("disciplineId") {
        Some(id) if value_to_string(id) == discipline_id => {}
        _ => return false,
    }

    if let Some(exact) = key.get("value") {
        match exact.as_f64() {
            Some(exact) if exact == performance => {}
            _ => return false,
        }
    }

    let lower = key.get("minValue").or_else(|| key.get("minTime"));
    if let Some(lower) = lower {
        match lower.as_f64() {
            Some(lower) if performance >= lower => {}
            _ => return false,
        }
    }

    let upper = key.get("maxValue").or_else(|| key.get("maxTime"));
    if let Some(upper) = upper {
        match upper.as_f64() {
            Some(upper) if performance <= upper => {}
            _ => return false,
        }
    }

    key.iter()
        .filter(|(name, _)| !RESERVED_TABLE_KEYS.contains(&name.as_str()))
        .all(|(name, expected)| {
            context
                .get(name)
                .is_some_and(|actual| *actual == value_to_string(expected))
        })
}

/// String form of a JSON value for equality checks against context values.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Checks that `table` has entries and that at least one of them names a
/// discipline.
pub fn validate_table(table: &TableDefinition) -> Result<()> {
    if table.entries.is_empty() {
        return Err(GradingError::configuration(format!(
            "Table {} has no entries",
            table.id
        )));
    }
    if !table
        .entries
        .iter()
        .any(|entry| entry.key.contains_key("disciplineId"))
    {
        return Err(GradingError::configuration(format!(
            "Table {} has no entries with a disciplineId",
            table.id
        )));
    }
    Ok(())
}

/// Renders a performance for display.
///
/// Times become `mm:ss unit` with seconds floored; distances and heights get
/// two decimal places.
pub fn format_performance(value: f64, unit: &str, measurement_type: MeasurementType) -> String {
    match measurement_type {
        MeasurementType::Time => {
            let minutes = (value / 60.0).floor() as u64;
            let seconds = (value % 60.0).floor() as u64;
            format!("{minutes:02}:{seconds:02} {unit}")
        }
        MeasurementType::Distance | MeasurementType::Height => format!("{value:.2} {unit}"),
    }
}
