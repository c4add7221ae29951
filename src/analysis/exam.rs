#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
/// A task of an exam and the points it is worth.
pub struct ExamTask {
    /// Identifier task scores refer to.
    pub id:         String,
    /// Title for display.
    pub title:      String,
    /// Points available for this task.
    pub max_points: f64,
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
/// An exam with its tasks. Task ids are unique within an exam, see
/// [`Exam::validate`].
pub struct Exam {
    /// Exam identifier.
    pub id:    String,
    /// Exam title.
    pub title: String,
    /// Tasks in exam order.
    #[builder(default)]
    pub tasks: Vec<ExamTask>,
}

impl Exam {
    /// Sum of the tasks' max points.
    pub fn total_points(&self) -> f64 {
        self.tasks.iter().map(|t| t.max_points).sum()
    }

    /// Rejects exams whose task ids are not unique.
    pub fn validate(&self) -> Result<()> {
        let duplicates = self.tasks.iter().map(|t| t.id.as_str()).duplicates().collect_vec();
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(GradingError::configuration(format!(
                "Exam {} has duplicate task ids: {}",
                self.id,
                duplicates.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Where a correction is in its workflow.
pub enum CorrectionStatus {
    /// Not started.
    #[default]
    Pending,
    /// Partially corrected.
    InProgress,
    /// Fully corrected.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Points a student received on one task.
pub struct TaskScore {
    /// The task these points belong to.
    pub task_id: String,
    /// Points received.
    pub points:  f64,
}

impl TaskScore {
    /// Creates a task score.
    pub fn new(task_id: impl Into<String>, points: f64) -> Self {
        Self {
            task_id: task_id.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
/// One student's corrected exam.
pub struct ExamResult {
    /// Student identifier.
    pub student_id:   String,
    /// Student name for display.
    #[builder(default)]
    #[serde(default)]
    pub student_name: String,
    /// Points per task. Tasks without an entry count as 0.
    #[builder(default)]
    #[serde(default)]
    pub task_scores:  Vec<TaskScore>,
    /// Total points over all tasks.
    #[builder(default)]
    #[serde(default)]
    pub total_points: f64,
    /// Total points as a percentage of the exam's points.
    #[builder(default)]
    #[serde(default)]
    pub percentage:   f64,
    /// Final grade as shown on the exam.
    #[builder(default)]
    #[serde(default)]
    pub grade:        String,
    /// Correction status.
    #[builder(default)]
    #[serde(default)]
    pub status:       CorrectionStatus,
}

impl ExamResult {
    /// Points for `task_id`, 0 when the task has no recorded score.
    pub fn score_for(&self, task_id: &str) -> f64 {
        self.task_scores
            .iter()
            .find(|s| s.task_id == task_id)
            .map_or(0.0, |s| s.points)
    }
}
