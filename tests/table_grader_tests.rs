use std::collections::HashMap;

use notenwerk::{
    GradingError,
    grade::{
        Certificate, CertificateThresholds, Discipline, MeasurementType, TableDefinition,
        TableEntry, TableGrader, format_performance, validate_table,
    },
};
use serde_json::{Value, json};

fn entry(key: Value, points: Value) -> TableEntry {
    let Value::Object(key) = key else {
        panic!("table keys are objects");
    };
    TableEntry { key, value: points }
}

fn table(entries: Vec<TableEntry>) -> TableDefinition {
    TableDefinition {
        id: "bjs-2024".into(),
        entries,
    }
}

fn discipline(id: &str, measurement_type: MeasurementType, unit: &str) -> Discipline {
    Discipline::builder()
        .id(id)
        .name(id.to_uppercase())
        .measurement_type(measurement_type)
        .unit(unit)
        .build()
}

fn performances(values: &[(&str, f64)]) -> HashMap<String, f64> {
    values.iter().map(|(id, v)| (id.to_string(), *v)).collect()
}

fn no_context() -> HashMap<String, String> {
    HashMap::new()
}

/// Four disciplines, each worth 800 points in the good range and 200
/// otherwise.
fn four_disciplines() -> (Vec<Discipline>, TableDefinition) {
    let disciplines = vec![
        discipline("sprint", MeasurementType::Time, "s"),
        discipline("jump", MeasurementType::Distance, "m"),
        discipline("throw", MeasurementType::Distance, "m"),
        discipline("run", MeasurementType::Time, "s"),
    ];
    let table = table(vec![
        entry(json!({ "disciplineId": "sprint", "minTime": 0, "maxTime": 8.5 }), json!(800)),
        entry(json!({ "disciplineId": "sprint", "minTime": 8.5 }), json!(200)),
        entry(json!({ "disciplineId": "jump", "minValue": 4.0 }), json!(800)),
        entry(json!({ "disciplineId": "jump", "maxValue": 4.0 }), json!(200)),
        entry(json!({ "disciplineId": "throw", "minValue": 30.0 }), json!(800)),
        entry(json!({ "disciplineId": "throw", "maxValue": 30.0 }), json!(200)),
        entry(json!({ "disciplineId": "run", "maxTime": 180 }), json!(800)),
        entry(json!({ "disciplineId": "run", "minTime": 180 }), json!(200)),
    ]);
    (disciplines, table)
}

#[test]
fn four_strong_disciplines_earn_an_honor_certificate() {
    let (disciplines, table) = four_disciplines();
    let score = TableGrader::new()
        .calculate_score(
            &disciplines,
            &performances(&[("sprint", 7.9), ("jump", 4.5), ("throw", 35.0), ("run", 170.0)]),
            &table,
            &no_context(),
        )
        .expect("score");

    assert_eq!(score.total_points, 3200.0);
    assert_eq!(score.certificate_type, Some(Certificate::Ehrenurkunde));
    assert_eq!(score.discipline_results.len(), 4);
    assert_eq!(score.discipline_results[0].discipline_id, "sprint");
    assert_eq!(score.discipline_results[0].points, 800.0);
    assert_eq!(score.discipline_results[3].formatted_performance, "02:50 s");
}

#[test]
fn first_matching_entry_wins() {
    let (disciplines, table) = four_disciplines();
    // 4.0 m sits on both jump ranges; the 800-point entry comes first.
    let score = TableGrader::new()
        .calculate_score(
            &disciplines,
            &performances(&[("sprint", 9.0), ("jump", 4.0), ("throw", 10.0), ("run", 200.0)]),
            &table,
            &no_context(),
        )
        .expect("score");

    assert_eq!(score.discipline_results[1].points, 800.0);
    assert_eq!(score.total_points, 1400.0);
    assert_eq!(score.certificate_type, Some(Certificate::Ehrenurkunde));
}

#[test]
fn range_bounds_are_inclusive() {
    let disciplines = vec![discipline("jump", MeasurementType::Distance, "m")];
    let table = table(vec![entry(
        json!({ "disciplineId": "jump", "minValue": 3.0, "maxValue": 3.5 }),
        json!(400),
    )]);

    for value in [3.0, 3.25, 3.5] {
        let score = TableGrader::new()
            .calculate_score(&disciplines, &performances(&[("jump", value)]), &table, &no_context())
            .expect("score");
        assert_eq!(score.total_points, 400.0);
    }

    let err = TableGrader::new()
        .calculate_score(&disciplines, &performances(&[("jump", 3.51)]), &table, &no_context())
        .unwrap_err();
    assert!(matches!(err, GradingError::Lookup(_)));
}

#[test]
fn exact_values_must_match() {
    let disciplines = vec![discipline("high", MeasurementType::Height, "m")];
    let table = table(vec![
        entry(json!({ "disciplineId": "high", "value": 1.2 }), json!(350)),
        entry(json!({ "disciplineId": "high", "value": 1.25 }), json!(375)),
    ]);

    let score = TableGrader::new()
        .calculate_score(&disciplines, &performances(&[("high", 1.25)]), &table, &no_context())
        .expect("score");
    assert_eq!(score.total_points, 375.0);
    assert_eq!(score.certificate_type, Some(Certificate::Teilnahmeurkunde));
}

#[test]
fn context_dimensions_must_be_supplied() {
    let disciplines = vec![discipline("sprint", MeasurementType::Time, "s")];
    let table = table(vec![
        entry(json!({ "disciplineId": "sprint", "gender": "m", "maxTime": 10 }), json!(500)),
        entry(json!({ "disciplineId": "sprint", "gender": "w", "maxTime": 10 }), json!(600)),
    ]);
    let times = performances(&[("sprint", 9.0)]);

    let context = HashMap::from([("gender".to_string(), "w".to_string())]);
    let score = TableGrader::new()
        .calculate_score(&disciplines, &times, &table, &context)
        .expect("score");
    assert_eq!(score.total_points, 600.0);

    let err = TableGrader::new()
        .calculate_score(&disciplines, &times, &table, &no_context())
        .unwrap_err();
    assert!(matches!(err, GradingError::Lookup(_)));
}

#[test]
fn numeric_context_values_compare_as_text() {
    let disciplines = vec![discipline("sprint", MeasurementType::Time, "s")];
    let table = table(vec![entry(
        json!({ "disciplineId": "sprint", "age": 12 }),
        json!(300),
    )]);
    let context = HashMap::from([("age".to_string(), "12".to_string())]);

    let score = TableGrader::new()
        .calculate_score(&disciplines, &performances(&[("sprint", 9.0)]), &table, &context)
        .expect("score");
    assert_eq!(score.total_points, 300.0);
}

#[test]
fn missing_and_invalid_performances_are_input_range_errors() {
    let (disciplines, table) = four_disciplines();

    let err = TableGrader::new()
        .calculate_score(
            &disciplines,
            &performances(&[("jump", 4.5), ("throw", 35.0), ("run", 170.0)]),
            &table,
            &no_context(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        GradingError::InputRange("Performance value missing for discipline: sprint".into())
    );

    for bad in [-1.0, f64::NAN] {
        let err = TableGrader::new()
            .calculate_score(
                &disciplines,
                &performances(&[("sprint", bad), ("jump", 4.5), ("throw", 35.0), ("run", 170.0)]),
                &table,
                &no_context(),
            )
            .unwrap_err();
        assert!(matches!(err, GradingError::InputRange(_)));
        assert!(
            err.to_string()
                .starts_with("Invalid performance value for discipline sprint")
        );
    }
}

#[test]
fn non_numeric_points_are_a_configuration_error() {
    let disciplines = vec![discipline("jump", MeasurementType::Distance, "m")];
    let table = table(vec![entry(json!({ "disciplineId": "jump" }), json!("viel"))]);

    let err = TableGrader::new()
        .calculate_score(&disciplines, &performances(&[("jump", 3.0)]), &table, &no_context())
        .unwrap_err();
    assert!(matches!(err, GradingError::Configuration(_)));
}

#[test]
fn tables_need_discipline_entries() {
    assert!(validate_table(&table(vec![])).is_err());
    assert!(validate_table(&table(vec![entry(json!({ "value": 1 }), json!(10))])).is_err());
    assert!(validate_table(&four_disciplines().1).is_ok());

    let err = TableGrader::new()
        .calculate_score(&[], &HashMap::new(), &table(vec![]), &no_context())
        .unwrap_err();
    assert!(matches!(err, GradingError::Configuration(_)));
}

#[test]
fn certificate_tiers_use_inclusive_lower_bounds() {
    let thresholds = CertificateThresholds::default();

    assert_eq!(thresholds.classify(1000.0), Some(Certificate::Ehrenurkunde));
    assert_eq!(thresholds.classify(999.99), Some(Certificate::Siegerurkunde));
    assert_eq!(thresholds.classify(600.0), Some(Certificate::Siegerurkunde));
    assert_eq!(thresholds.classify(599.0), Some(Certificate::Teilnahmeurkunde));
    assert_eq!(thresholds.classify(0.5), Some(Certificate::Teilnahmeurkunde));
    assert_eq!(thresholds.classify(0.0), None);
}

#[test]
fn certificate_thresholds_are_configurable() {
    let grader = TableGrader::builder()
        .thresholds(CertificateThresholds::builder().honor(1200.0).winner(900.0).build())
        .build();
    let disciplines = vec![discipline("jump", MeasurementType::Distance, "m")];
    let table = table(vec![entry(json!({ "disciplineId": "jump" }), json!(1000))]);

    let score = grader
        .calculate_score(&disciplines, &performances(&[("jump", 3.0)]), &table, &no_context())
        .expect("score");
    assert_eq!(score.certificate_type, Some(Certificate::Siegerurkunde));
    assert_eq!(grader.thresholds().honor, 1200.0);
}

#[test]
fn certificates_serialize_in_lowercase() {
    assert_eq!(
        serde_json::to_string(&Certificate::Ehrenurkunde).unwrap(),
        "\"ehrenurkunde\""
    );
    assert_eq!(Certificate::Teilnahmeurkunde.to_string(), "teilnahmeurkunde");
}

#[test]
fn performances_are_formatted_by_measurement_type() {
    insta::assert_snapshot!(format_performance(83.7, "s", MeasurementType::Time), @"01:23 s");
    insta::assert_snapshot!(format_performance(605.9, "s", MeasurementType::Time), @"10:05 s");
    insta::assert_snapshot!(format_performance(3.75, "m", MeasurementType::Distance), @"3.75 m");
    insta::assert_snapshot!(format_performance(1.2, "m", MeasurementType::Height), @"1.20 m");
}
