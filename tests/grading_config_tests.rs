use std::collections::HashMap;

use notenwerk::{
    GradingConfig, GradingError, Measurement, Outcome, Settings,
    grade::{BoundaryGrade, Certificate},
    report,
};

const CRITERIA: &str = r#"{
    "type": "criteria",
    "criteria": [
        { "id": "c1", "name": "Technik", "weight": 2 },
        { "id": "c2", "name": "Ausdauer" }
    ]
}"#;

const TIME: &str = r#"{
    "type": "time",
    "bestGrade": 1,
    "worstGrade": 6,
    "customBoundaries": [{ "time": 120, "grade": 6 }, { "time": 60, "grade": 1 }]
}"#;

const TABLE: &str = r#"{
    "type": "table",
    "disciplines": [
        { "id": "sprint", "name": "50 m", "measurementType": "time", "unit": "s" },
        { "id": "jump", "name": "Weitsprung", "measurementType": "distance", "unit": "m" }
    ],
    "table": {
        "id": "bjs",
        "entries": [
            { "key": { "disciplineId": "sprint", "gender": "w", "maxTime": 8.0 }, "value": 650 },
            { "key": { "disciplineId": "sprint", "gender": "w", "minTime": 8.0 }, "value": 300 },
            { "key": { "disciplineId": "jump", "minValue": 4.0 }, "value": 500 },
            { "key": { "disciplineId": "jump", "maxValue": 4.0 }, "value": 250 }
        ]
    }
}"#;

fn config(json: &str) -> GradingConfig {
    GradingConfig::from_json(json).expect("config")
}

fn measurement(json: &str) -> Measurement {
    Measurement::from_json(json).expect("measurement")
}

#[test]
fn criteria_configs_grade_scores() {
    let outcome = config(CRITERIA)
        .grade(&measurement(
            r#"{ "kind": "scores", "scores": [
                { "criterionId": "c1", "value": 90 },
                { "criterionId": "c2", "value": 60 }
            ] }"#,
        ))
        .expect("grade");

    let Outcome::Criteria(grade) = &outcome else {
        panic!("expected a criteria outcome, got {outcome:?}");
    };
    assert_eq!(grade.total_weighted_score, 80.0);
    assert_eq!(grade.display_value, "3");

    let rendered = report::render_outcome(&outcome);
    assert!(rendered.contains("Criteria Breakdown"));
    assert!(rendered.contains("Technik"));
    assert!(rendered.contains("grade 3"));
}

#[test]
fn time_configs_grade_times() {
    let outcome = config(TIME)
        .grade(&measurement(r#"{ "kind": "time", "seconds": 90 }"#))
        .expect("grade");

    let Outcome::Time(grade) = &outcome else {
        panic!("expected a time outcome, got {outcome:?}");
    };
    assert_eq!(grade.grade, BoundaryGrade::Number(3.5));
    assert!(report::render_outcome(&outcome).contains("Grade: 3.5"));
}

#[test]
fn table_configs_grade_performances_in_context() {
    let outcome = config(TABLE)
        .grade(&measurement(
            r#"{
                "kind": "performances",
                "performances": { "sprint": 7.6, "jump": 4.2 },
                "context": { "gender": "w" }
            }"#,
        ))
        .expect("grade");

    let Outcome::Table(score) = &outcome else {
        panic!("expected a table outcome, got {outcome:?}");
    };
    assert_eq!(score.total_points, 1150.0);
    assert_eq!(score.certificate_type, Some(Certificate::Ehrenurkunde));

    let rendered = report::render_outcome(&outcome);
    assert!(rendered.contains("Weitsprung"));
    assert!(rendered.contains("4.20 m"));
    assert!(rendered.contains("ehrenurkunde"));
}

#[test]
fn outcomes_serialize_with_a_type_tag() {
    let outcome = config(TIME)
        .grade(&measurement(r#"{ "kind": "time", "seconds": 30 }"#))
        .expect("grade");

    let json = serde_json::to_value(&outcome).expect("serialize");
    assert_eq!(json["type"], "time");
    assert_eq!(json["grade"], 1.0);
    assert_eq!(json["bestTime"], 60.0);
}

#[test]
fn mismatched_measurements_are_rejected() {
    let err = config(TIME)
        .grade(&measurement(r#"{ "kind": "scores", "scores": [] }"#))
        .unwrap_err();

    assert_eq!(
        err,
        GradingError::Configuration("A time configuration cannot grade scores measurements".into())
    );
}

#[test]
fn unknown_or_malformed_json_is_reported() {
    let err = GradingConfig::from_json(r#"{ "type": "dice" }"#).unwrap_err();
    assert!(matches!(err, GradingError::Configuration(_)));

    let err = Measurement::from_json("not json").unwrap_err();
    assert!(matches!(err, GradingError::InputRange(_)));
}

#[test]
fn validate_checks_without_grading() {
    assert!(config(CRITERIA).validate().is_ok());
    assert!(config(TIME).validate().is_ok());
    assert!(config(TABLE).validate().is_ok());
    assert_eq!(config(TIME).kind(), "time");

    let duplicate = config(
        r#"{ "type": "criteria", "criteria": [
            { "id": "a", "name": "Test" },
            { "id": "b", "name": "test" }
        ] }"#,
    );
    let err = duplicate.validate().unwrap_err();
    assert!(err.message().contains("Duplicate criterion names found"));

    let empty_table = config(r#"{ "type": "table", "disciplines": [], "table": { "id": "x", "entries": [] } }"#);
    assert!(empty_table.validate().is_err());
}

#[test]
fn settings_read_overrides_and_ignore_garbage() {
    let vars = HashMap::from([
        ("NOTENWERK_TARGET_DIFFICULTY", "0.7"),
        ("NOTENWERK_RISK_THRESHOLD", "sixty"),
    ]);

    let settings = Settings::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(settings.target_difficulty(), 0.7);
    assert_eq!(settings.risk_threshold(), 50.0);
    assert_eq!(settings.outlier_threshold(), 0.2);

    let overridden = settings.set_risk_threshold(40.0).set_outlier_threshold(0.3);
    assert_eq!(overridden.risk_threshold(), 40.0);
    assert_eq!(overridden.outlier_threshold(), 0.3);
    assert_eq!(Settings::from_lookup(|_| None), Settings::default());
}
