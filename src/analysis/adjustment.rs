#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{
    exam::{Exam, ExamResult},
    statistics::analyze_exam_difficulty,
};
use crate::{
    constants::{DIFFICULTY_TOLERANCE, POINT_ADJUSTMENT_RATE},
    error::Result,
};

/// Reason given for tasks that lose points.
pub const TOO_DIFFICULT: &str = "Task is too difficult";
/// Reason given for tasks that gain points.
pub const TOO_EASY: &str = "Task is too easy";
/// Reason given for tasks only touched by rebalancing.
pub const MINOR_BALANCING: &str = "Minor balancing adjustment";

#[derive(Debug, Clone, PartialEq, Tabled, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A suggested change to one task's points.
pub struct PointAdjustment {
    #[tabled(rename = "Task")]
    /// * `task_id`: the task identifier
    pub task_id:          String,
    #[tabled(rename = "Title")]
    /// * `task_title`: the task title
    pub task_title:       String,
    #[tabled(rename = "Current")]
    /// * `current_points`: points the task is worth now
    pub current_points:   f64,
    #[tabled(rename = "Suggested")]
    /// * `suggested_points`: points the task should be worth
    pub suggested_points: f64,
    #[tabled(rename = "Change")]
    /// * `change`: suggested minus current
    pub change:           f64,
    #[tabled(rename = "Reason")]
    /// * `reason`: why the task changes
    pub reason:           String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Expected effect of applying a suggestion.
pub struct ImpactAnalysis {
    /// Difficulty index of the exam, weighted by current points.
    pub current_weighted_difficulty:   f64,
    /// Difficulty index of the exam, weighted by suggested points, assuming
    /// students keep the same share of each task.
    pub projected_weighted_difficulty: f64,
    /// The difficulty index the suggestion aims for.
    pub target_difficulty:             f64,
    /// Number of tasks whose points change.
    pub adjusted_task_count:           usize,
    /// Total points, identical before and after.
    pub total_points:                  f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Rebalanced point values for an exam.
///
/// The suggested distribution always sums to the same total as the current
/// one.
pub struct PointAdjustmentSuggestion {
    /// Points per task id as they are now.
    pub current_distribution:   BTreeMap<String, f64>,
    /// Points per task id after rebalancing.
    pub suggested_distribution: BTreeMap<String, f64>,
    /// Tasks whose points change, in exam order.
    pub adjustments:            Vec<PointAdjustment>,
    /// Expected effect of the suggestion.
    pub impact_analysis:        ImpactAnalysis,
}

/// Difficulty index of the whole exam with tasks weighted by `points`.
fn weighted_difficulty(indices: &[f64], points: &[f64]) -> f64 {
    let total: f64 = points.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    indices.iter().zip(points).map(|(d, p)| d * p).sum::<f64>() / total
}

/// Suggests new point values that move each task towards
/// `target_difficulty` while keeping the exam's total points unchanged.
///
/// Tasks more than 0.1 below the target lose 15% of their points, tasks more
/// than 0.1 above gain 15%. The resulting deficit is shared out by each
/// task's share of the current total, then every value is rescaled to the
/// current total. Each step rounds to whole points; what rounding leaves over
/// goes to the task with the most suggested points.
///
/// Fails when task ids are not unique, since the distributions are keyed by
/// task id.
pub fn suggest_point_adjustments(
    exam: &Exam,
    results: &[ExamResult],
    target_difficulty: f64,
) -> Result<PointAdjustmentSuggestion> {
    exam.validate()?;

    let stats = analyze_exam_difficulty(exam, results);
    let current = exam.tasks.iter().map(|t| t.max_points).collect_vec();
    let indices = stats
        .task_analyses
        .iter()
        .map(|a| a.difficulty_index)
        .collect_vec();
    let total_current: f64 = current.iter().sum();

    let reasons = indices
        .iter()
        .map(|index| {
            if *index < target_difficulty - DIFFICULTY_TOLERANCE {
                Some(TOO_DIFFICULT)
            } else if *index > target_difficulty + DIFFICULTY_TOLERANCE {
                Some(TOO_EASY)
            } else {
                None
            }
        })
        .collect_vec();

    let mut suggested = current
        .iter()
        .zip(&reasons)
        .map(|(points, reason)| match *reason {
            Some(TOO_DIFFICULT) => (points * (1.0 - POINT_ADJUSTMENT_RATE)).round(),
            Some(_) => (points * (1.0 + POINT_ADJUSTMENT_RATE)).round(),
            None => *points,
        })
        .collect_vec();

    if total_current > 0.0 {
        let deficit = total_current - suggested.iter().sum::<f64>();
        for (value, points) in suggested.iter_mut().zip(&current) {
            *value += (deficit * (points / total_current)).round();
        }
    }

    let total_suggested: f64 = suggested.iter().sum();
    if total_suggested > 0.0 && total_suggested != total_current {
        let factor = total_current / total_suggested;
        for value in suggested.iter_mut() {
            *value = (*value * factor).round();
        }
    }

    let residue = total_current - suggested.iter().sum::<f64>();
    if residue != 0.0 {
        let largest = suggested
            .iter()
            .enumerate()
            .rev()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i);
        if let Some(i) = largest {
            tracing::debug!("Assigning rounding residue of {residue} to task {}", exam.tasks[i].id);
            suggested[i] += residue;
        }
    }

    let adjustments = exam
        .tasks
        .iter()
        .zip(current.iter().zip(&suggested))
        .zip(&reasons)
        .filter(|((_, (current, suggested)), _)| current != suggested)
        .map(|((task, (current, suggested)), reason)| PointAdjustment {
            task_id:          task.id.clone(),
            task_title:       task.title.clone(),
            current_points:   *current,
            suggested_points: *suggested,
            change:           suggested - current,
            reason:           reason.unwrap_or(MINOR_BALANCING).to_string(),
        })
        .collect_vec();

    tracing::debug!(
        "Suggested {} point adjustments for exam {} (target difficulty {target_difficulty})",
        adjustments.len(),
        exam.id
    );

    let to_distribution = |points: &[f64]| -> BTreeMap<String, f64> {
        exam.tasks
            .iter()
            .zip(points)
            .map(|(task, p)| (task.id.clone(), *p))
            .collect()
    };

    Ok(PointAdjustmentSuggestion {
        current_distribution: to_distribution(&current),
        suggested_distribution: to_distribution(&suggested),
        impact_analysis: ImpactAnalysis {
            current_weighted_difficulty: weighted_difficulty(&indices, &current),
            projected_weighted_difficulty: weighted_difficulty(&indices, &suggested),
            target_difficulty,
            adjusted_task_count: adjustments.len(),
            total_points: total_current,
        },
        adjustments,
    })
}
