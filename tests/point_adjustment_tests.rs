use notenwerk::{
    GradingError,
    analysis::{
        Exam, ExamResult, ExamTask, MINOR_BALANCING, TOO_DIFFICULT, TOO_EASY, TaskScore,
        suggest_point_adjustments,
    },
};
use proptest::prelude::*;

fn exam(points: &[f64]) -> Exam {
    Exam::builder()
        .id("bio-9a")
        .title("Zellbiologie")
        .tasks(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    ExamTask::builder()
                        .id(format!("t{}", i + 1))
                        .title(format!("Aufgabe {}", i + 1))
                        .max_points(*p)
                        .build()
                })
                .collect(),
        )
        .build()
}

fn result(student: &str, scores: &[f64]) -> ExamResult {
    ExamResult::builder()
        .student_id(student)
        .task_scores(
            scores
                .iter()
                .enumerate()
                .map(|(i, p)| TaskScore::new(format!("t{}", i + 1), *p))
                .collect(),
        )
        .total_points(scores.iter().sum::<f64>())
        .build()
}

#[test]
fn difficult_tasks_lose_and_easy_tasks_gain_points() {
    let exam = exam(&[20.0, 40.0, 40.0]);
    // Difficulty indices 0.1, 0.6 and 0.95.
    let results = vec![result("a", &[2.0, 24.0, 38.0])];

    let suggestion = suggest_point_adjustments(&exam, &results, 0.6).expect("suggestion");

    assert_eq!(
        suggestion.suggested_distribution.values().copied().collect::<Vec<_>>(),
        vec![16.0, 39.0, 45.0]
    );
    assert_eq!(
        suggestion.current_distribution.values().copied().collect::<Vec<_>>(),
        vec![20.0, 40.0, 40.0]
    );

    let reasons = suggestion
        .adjustments
        .iter()
        .map(|a| (a.task_id.as_str(), a.change, a.reason.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        reasons,
        vec![
            ("t1", -4.0, TOO_DIFFICULT),
            ("t2", -1.0, MINOR_BALANCING),
            ("t3", 5.0, TOO_EASY),
        ]
    );

    let impact = &suggestion.impact_analysis;
    assert_eq!(impact.total_points, 100.0);
    assert_eq!(impact.adjusted_task_count, 3);
    assert_eq!(impact.target_difficulty, 0.6);
    assert!((impact.current_weighted_difficulty - 0.64).abs() < 1e-9);
    assert!((impact.projected_weighted_difficulty - 0.6775).abs() < 1e-9);
}

#[test]
fn balanced_exams_need_no_adjustment() {
    let exam = exam(&[10.0, 20.0]);
    let results = vec![result("a", &[6.0, 12.0]), result("b", &[6.0, 12.0])];

    let suggestion = suggest_point_adjustments(&exam, &results, 0.6).expect("suggestion");

    assert!(suggestion.adjustments.is_empty());
    assert_eq!(suggestion.current_distribution, suggestion.suggested_distribution);
    assert_eq!(suggestion.impact_analysis.adjusted_task_count, 0);
}

#[test]
fn exams_without_tasks_yield_an_empty_suggestion() {
    let suggestion = suggest_point_adjustments(&exam(&[]), &[], 0.6).expect("suggestion");

    assert!(suggestion.adjustments.is_empty());
    assert!(suggestion.suggested_distribution.is_empty());
    assert_eq!(suggestion.impact_analysis.total_points, 0.0);
    assert_eq!(suggestion.impact_analysis.projected_weighted_difficulty, 0.0);
}

#[test]
fn duplicate_task_ids_are_rejected() {
    let mut exam = exam(&[10.0, 20.0, 30.0]);
    exam.tasks[2].id = "t1".into();

    let err = suggest_point_adjustments(&exam, &[result("a", &[5.0, 10.0, 15.0])], 0.6)
        .unwrap_err();

    assert_eq!(
        err,
        GradingError::Configuration("Exam bio-9a has duplicate task ids: t1".into())
    );
    assert!(exam.validate().is_err());
}

/// Tasks with whole-number maximums and results scored within them.
fn exam_and_results() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
    prop::collection::vec(1u32..=50, 1..8).prop_flat_map(|points| {
        let row = points
            .iter()
            .map(|max| (0..=*max).prop_map(f64::from))
            .collect::<Vec<_>>();
        let points = points.into_iter().map(f64::from).collect::<Vec<_>>();
        (Just(points), prop::collection::vec(row, 0..10))
    })
}

proptest! {
    #[test]
    fn total_points_are_preserved((points, rows) in exam_and_results(), target in 0.0..=1.0f64) {
        let exam = exam(&points);
        let results = rows
            .iter()
            .enumerate()
            .map(|(i, scores)| result(&format!("s{i}"), scores))
            .collect::<Vec<_>>();

        let suggestion = suggest_point_adjustments(&exam, &results, target).unwrap();

        let current: f64 = points.iter().sum();
        let suggested: f64 = suggestion.suggested_distribution.values().sum();
        prop_assert_eq!(suggested, current);
        prop_assert_eq!(suggestion.suggested_distribution.len(), points.len());
        for adjustment in &suggestion.adjustments {
            prop_assert!(adjustment.change != 0.0);
        }
    }
}
