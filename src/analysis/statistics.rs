#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeMap, fmt::Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::exam::{CorrectionStatus, Exam, ExamResult};
use crate::{
    constants::{CRITICAL_RISK_FACTOR, CRITICAL_SCORE_RATIO, EXCELLENT_SCORE_RATIO},
    util,
};

#[derive(Debug, Clone, Default, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Descriptive statistics for one task.
pub struct DifficultyAnalysis {
    #[tabled(rename = "Task")]
    /// * `task_id`: the task identifier
    pub task_id:            String,
    #[tabled(rename = "Title")]
    /// * `task_title`: the task title
    pub task_title:         String,
    #[tabled(rename = "Max")]
    /// * `max_points`: points available
    pub max_points:         f64,
    #[tabled(rename = "Average")]
    /// * `average_score`: mean points, missing scores counted as 0
    pub average_score:      f64,
    #[tabled(rename = "Median")]
    /// * `median_score`: median points
    pub median_score:       f64,
    #[tabled(rename = "Std. dev.")]
    /// * `standard_deviation`: population standard deviation of points
    pub standard_deviation: f64,
    #[tabled(rename = "Difficulty")]
    /// * `difficulty_index`: average over max points, 0 hardest, 1 easiest
    pub difficulty_index:   f64,
    #[tabled(rename = "< 50%")]
    /// * `critical_count`: students below half the points
    pub critical_count:     usize,
    #[tabled(rename = "> 80%")]
    /// * `excellent_count`: students above 80% of the points
    pub excellent_count:    usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Exam-wide statistics plus one [`DifficultyAnalysis`] per task.
pub struct ExamStatistics {
    /// The analysed exam.
    pub exam_id:            String,
    /// Number of results analysed.
    pub participant_count:  usize,
    /// Number of results whose correction is completed.
    pub completed_count:    usize,
    /// Mean total points.
    pub average_points:     f64,
    /// Median total points.
    pub median_points:      f64,
    /// Population standard deviation of total points.
    pub standard_deviation: f64,
    /// Lowest total points.
    pub min_points:         f64,
    /// Highest total points.
    pub max_points:         f64,
    /// Mean percentage.
    pub average_percentage: f64,
    /// Number of results per final grade.
    pub grade_distribution: BTreeMap<String, usize>,
    /// Per-task analyses in exam order.
    pub task_analyses:      Vec<DifficultyAnalysis>,
}

impl ExamStatistics {
    /// Mean difficulty index over all tasks, 0 when there are none.
    pub fn mean_difficulty(&self) -> f64 {
        util::mean(
            &self
                .task_analyses
                .iter()
                .map(|t| t.difficulty_index)
                .collect_vec(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Tasks whose difficulty stands out from the rest of the exam.
pub struct Outliers {
    /// Mean difficulty index the tasks were compared against.
    pub mean_difficulty: f64,
    /// Tasks noticeably harder than the mean.
    pub very_difficult:  Vec<DifficultyAnalysis>,
    /// Tasks noticeably easier than the mean.
    pub very_easy:       Vec<DifficultyAnalysis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How far below the risk threshold a student is.
pub enum RiskLevel {
    /// Below 70% of the threshold.
    Critical,
    /// Below the threshold.
    Warning,
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A student whose percentage is below the risk threshold.
pub struct StudentRisk {
    #[tabled(rename = "Student")]
    /// * `student_id`: the student identifier
    pub student_id:   String,
    #[tabled(rename = "Name")]
    /// * `student_name`: the student name
    pub student_name: String,
    #[tabled(rename = "Percentage")]
    /// * `percentage`: the student's percentage
    pub percentage:   f64,
    #[tabled(rename = "Risk")]
    /// * `risk_level`: how far below the threshold
    pub risk_level:   RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Spread of the scores of students who attempted a task.
pub struct TaskVariance {
    #[tabled(rename = "Task")]
    /// * `task_id`: the task identifier
    pub task_id:            String,
    #[tabled(rename = "Attempts")]
    /// * `attempted_count`: number of non-zero scores
    pub attempted_count:    usize,
    #[tabled(rename = "Std. dev.")]
    /// * `standard_deviation`: population standard deviation of non-zero
    ///   scores
    pub standard_deviation: f64,
}

/// Points every result has for `task_id`, missing ones as 0.
fn task_scores(task_id: &str, results: &[ExamResult]) -> Vec<f64> {
    results.iter().map(|r| r.score_for(task_id)).collect()
}

/// Analyses how difficult one task was across `results`.
///
/// An empty `results` slice yields an all-zero analysis.
pub fn analyze_difficulty(
    task_id: &str,
    title: &str,
    max_points: f64,
    results: &[ExamResult],
) -> DifficultyAnalysis {
    let scores = task_scores(task_id, results);
    let average_score = util::mean(&scores);

    let difficulty_index = if max_points > 0.0 {
        (average_score / max_points).clamp(0.0, 1.0)
    } else {
        0.0
    };

    DifficultyAnalysis {
        task_id: task_id.to_string(),
        task_title: title.to_string(),
        max_points,
        average_score,
        median_score: util::median(&scores),
        standard_deviation: util::std_dev(&scores),
        difficulty_index,
        critical_count: scores
            .iter()
            .filter(|s| **s < max_points * CRITICAL_SCORE_RATIO)
            .count(),
        excellent_count: scores
            .iter()
            .filter(|s| **s > max_points * EXCELLENT_SCORE_RATIO)
            .count(),
    }
}

/// Builds exam-wide statistics and a per-task difficulty analysis.
pub fn analyze_exam_difficulty(exam: &Exam, results: &[ExamResult]) -> ExamStatistics {
    if results.is_empty() {
        tracing::warn!("No results for exam {}; statistics are all zero", exam.id);
    }

    let task_analyses = exam
        .tasks
        .iter()
        .map(|task| analyze_difficulty(&task.id, &task.title, task.max_points, results))
        .collect_vec();

    let totals = results.iter().map(|r| r.total_points).collect_vec();
    let percentages = results.iter().map(|r| r.percentage).collect_vec();

    let grade_distribution = results
        .iter()
        .map(|r| r.grade.clone())
        .fold(BTreeMap::new(), |mut acc, grade| {
            *acc.entry(grade).or_insert(0) += 1;
            acc
        });

    ExamStatistics {
        exam_id: exam.id.clone(),
        participant_count: results.len(),
        completed_count: results
            .iter()
            .filter(|r| r.status == CorrectionStatus::Completed)
            .count(),
        average_points: util::mean(&totals),
        median_points: util::median(&totals),
        standard_deviation: util::std_dev(&totals),
        min_points: util::min(&totals),
        max_points: util::max(&totals),
        average_percentage: util::mean(&percentages),
        grade_distribution,
        task_analyses,
    }
}

/// Finds tasks whose difficulty index differs from the exam mean by more than
/// `threshold`.
pub fn identify_outliers(stats: &ExamStatistics, threshold: f64) -> Outliers {
    let mean_difficulty = stats.mean_difficulty();

    let (very_difficult, rest): (Vec<_>, Vec<_>) = stats
        .task_analyses
        .iter()
        .cloned()
        .partition(|t| mean_difficulty - t.difficulty_index > threshold);
    let very_easy = rest
        .into_iter()
        .filter(|t| t.difficulty_index - mean_difficulty > threshold)
        .collect_vec();

    Outliers {
        mean_difficulty,
        very_difficult,
        very_easy,
    }
}

/// Lists students below `risk_threshold` percent, lowest percentage first.
pub fn identify_students_at_risk(results: &[ExamResult], risk_threshold: f64) -> Vec<StudentRisk> {
    results
        .iter()
        .filter_map(|r| {
            let risk_level = if r.percentage < risk_threshold * CRITICAL_RISK_FACTOR {
                RiskLevel::Critical
            } else if r.percentage < risk_threshold {
                RiskLevel::Warning
            } else {
                return None;
            };
            Some(StudentRisk {
                student_id: r.student_id.clone(),
                student_name: r.student_name.clone(),
                percentage: r.percentage,
                risk_level,
            })
        })
        .sorted_by(|a, b| a.percentage.total_cmp(&b.percentage))
        .collect()
}

/// Standard deviation of the non-zero scores of each task, in exam order.
///
/// Zero scores are treated as unattempted and left out.
pub fn calculate_task_variance(results: &[ExamResult], exam: &Exam) -> Vec<TaskVariance> {
    exam.tasks
        .iter()
        .map(|task| {
            let attempted = task_scores(&task.id, results)
                .into_iter()
                .filter(|s| *s != 0.0)
                .collect_vec();
            TaskVariance {
                task_id:            task.id.clone(),
                attempted_count:    attempted.len(),
                standard_deviation: util::std_dev(&attempted),
            }
        })
        .collect()
}
