#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    analysis::{ExamStatistics, Outliers, PointAdjustmentSuggestion, StudentRisk, TaskVariance},
    config::Outcome,
    grade::{TableScore, TimeGrade, WeightedGrade},
};

/// Applies the house style: header and footer panels, wrapped body, centred
/// header and footer rows.
fn styled(mut table: Table, header: impl Into<String>, footer: Option<String>) -> String {
    table.with(Panel::header(header.into()));
    if let Some(footer) = footer {
        table.with(Panel::footer(footer));
    }
    table
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(28).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Two-column table of labelled values.
fn key_values<I, K, V>(rows: I) -> Table
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.into(), value.into()]);
    }
    builder.build()
}

/// Renders a criteria-weighted grade with its breakdown.
pub fn render_weighted_grade(grade: &WeightedGrade) -> String {
    styled(
        Table::new(&grade.breakdown),
        "Criteria Breakdown",
        Some(format!(
            "Total: {:.2}% (grade {})",
            grade.total_weighted_score, grade.display_value
        )),
    )
}

/// Renders a time grade.
pub fn render_time_grade(grade: &TimeGrade) -> String {
    styled(
        key_values([
            ("Time", format!("{:.2}s", grade.time_in_seconds)),
            ("Best time", format!("{:.2}s", grade.best_time)),
            ("Worst time", format!("{:.2}s", grade.worst_time)),
        ]),
        "Time Grade",
        Some(format!("Grade: {}", grade.grade)),
    )
}

/// Renders a multi-discipline score with its certificate.
pub fn render_table_score(score: &TableScore) -> String {
    let certificate = score
        .certificate_type
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    styled(
        Table::new(&score.discipline_results),
        "Discipline Scores",
        Some(format!("Total: {} points, certificate: {certificate}", score.total_points)),
    )
}

/// Renders whichever outcome a grading configuration produced.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Criteria(grade) => render_weighted_grade(grade),
        Outcome::Time(grade) => render_time_grade(grade),
        Outcome::Table(score) => render_table_score(score),
    }
}

/// Renders exam-wide statistics, the grade histogram and per-task
/// difficulty.
pub fn render_exam_statistics(stats: &ExamStatistics) -> String {
    let overview = styled(
        key_values([
            ("Participants", stats.participant_count.to_string()),
            ("Completed", stats.completed_count.to_string()),
            ("Average", format!("{:.2}", stats.average_points)),
            ("Median", format!("{:.2}", stats.median_points)),
            ("Std. dev.", format!("{:.2}", stats.standard_deviation)),
            ("Min", format!("{:.2}", stats.min_points)),
            ("Max", format!("{:.2}", stats.max_points)),
            ("Average %", format!("{:.2}", stats.average_percentage)),
        ]),
        format!("Exam {}", stats.exam_id),
        None,
    );

    let distribution = styled(
        key_values(
            stats
                .grade_distribution
                .iter()
                .map(|(grade, count)| (grade.clone(), count.to_string())),
        ),
        "Grade Distribution",
        None,
    );

    let tasks = styled(
        Table::new(&stats.task_analyses),
        "Task Difficulty",
        Some(format!("Mean difficulty: {:.2}", stats.mean_difficulty())),
    );

    [overview, distribution, tasks].join("\n")
}

/// Renders very difficult and very easy tasks.
pub fn render_outliers(outliers: &Outliers) -> String {
    let names = |tasks: &[crate::analysis::DifficultyAnalysis]| {
        if tasks.is_empty() {
            "-".to_string()
        } else {
            tasks
                .iter()
                .map(|t| format!("{} ({:.2})", t.task_id, t.difficulty_index))
                .join(", ")
        }
    };

    styled(
        key_values([
            ("Very difficult", names(&outliers.very_difficult)),
            ("Very easy", names(&outliers.very_easy)),
        ]),
        "Outliers",
        Some(format!("Mean difficulty: {:.2}", outliers.mean_difficulty)),
    )
}

/// Renders students below the risk threshold.
pub fn render_students_at_risk(students: &[StudentRisk]) -> String {
    styled(
        Table::new(students),
        "Students at Risk",
        Some(format!("{} students", students.len())),
    )
}

/// Renders the spread of attempted scores per task.
pub fn render_task_variance(variance: &[TaskVariance]) -> String {
    styled(Table::new(variance), "Score Spread", None)
}

/// Renders a point adjustment suggestion.
pub fn render_point_adjustments(suggestion: &PointAdjustmentSuggestion) -> String {
    let impact = &suggestion.impact_analysis;
    styled(
        Table::new(&suggestion.adjustments),
        format!(
            "Point Adjustments (target difficulty {:.2})",
            impact.target_difficulty
        ),
        Some(format!(
            "Difficulty {:.2} -> {:.2}, total {} points",
            impact.current_weighted_difficulty,
            impact.projected_weighted_difficulty,
            impact.total_points
        )),
    )
}
