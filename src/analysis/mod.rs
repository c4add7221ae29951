#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Point redistribution suggestions.
pub mod adjustment;
/// Exams, tasks and corrected results.
pub mod exam;
/// Descriptive statistics over corrected results.
pub mod statistics;

pub use adjustment::{
    ImpactAnalysis, MINOR_BALANCING, PointAdjustment, PointAdjustmentSuggestion, TOO_DIFFICULT,
    TOO_EASY, suggest_point_adjustments,
};
pub use exam::{CorrectionStatus, Exam, ExamResult, ExamTask, TaskScore};
pub use statistics::{
    DifficultyAnalysis, ExamStatistics, Outliers, RiskLevel, StudentRisk, TaskVariance,
    analyze_difficulty, analyze_exam_difficulty, calculate_task_variance, identify_outliers,
    identify_students_at_risk,
};
