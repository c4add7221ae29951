#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Maximum number of criteria a weighted grading set may contain.
pub const MAX_CRITERIA: usize = 8;

/// Lowest score a criterion slider can produce.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score a criterion slider can produce.
pub const MAX_SCORE: f64 = 100.0;

/// Inclusive lower percentage bounds for the German 1–5 grades, best first.
/// Anything below the last bound is a 6.
pub const GRADE_THRESHOLDS: [(f64, u8); 5] = [(92.0, 1), (81.0, 2), (67.0, 3), (50.0, 4), (30.0, 5)];

/// Points needed for an Ehrenurkunde.
pub const HONOR_CERTIFICATE_POINTS: f64 = 1000.0;

/// Points needed for a Siegerurkunde.
pub const WINNER_CERTIFICATE_POINTS: f64 = 600.0;

/// Table entry keys with a fixed meaning. Every other key is a context
/// dimension.
pub const RESERVED_TABLE_KEYS: [&str; 6] =
    ["disciplineId", "value", "minValue", "maxValue", "minTime", "maxTime"];

/// Distance from the mean difficulty that marks a task as an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.2;

/// Difficulty index point adjustments aim for unless configured otherwise.
pub const DEFAULT_TARGET_DIFFICULTY: f64 = 0.6;

/// Percentage below which a student is flagged as at risk.
pub const DEFAULT_RISK_THRESHOLD: f64 = 50.0;

/// Tolerance around the target difficulty before a task is rebalanced.
pub const DIFFICULTY_TOLERANCE: f64 = 0.1;

/// Relative change applied to tasks that are too hard or too easy.
pub const POINT_ADJUSTMENT_RATE: f64 = 0.15;

/// Fraction of the risk threshold below which a student is critical.
pub const CRITICAL_RISK_FACTOR: f64 = 0.7;

/// Share of max points below which a score is critical.
pub const CRITICAL_SCORE_RATIO: f64 = 0.5;

/// Share of max points above which a score is excellent.
pub const EXCELLENT_SCORE_RATIO: f64 = 0.8;
