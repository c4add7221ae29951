#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Criteria-weighted grading of slider scores.
pub mod criteria;
/// Shared grade types.
pub mod results;
/// Table-driven multi-discipline scoring.
pub mod table;
/// Linear time-interpolation grading.
pub mod time;

pub use criteria::{
    CriteriaGrader, CriteriaScore, CriteriaValidation, Criterion, CriterionBreakdown,
    WeightedGrade,
};
pub use results::SchoolGrade;
pub use table::{
    Certificate, CertificateThresholds, Discipline, DisciplineResult, MeasurementType,
    TableDefinition, TableEntry, TableGrader, TableScore, format_performance, validate_table,
};
pub use time::{
    BoundaryAdjustment, BoundaryGrade, TimeBoundary, TimeGrade, TimeGrader, TimeGradingConfig,
};
