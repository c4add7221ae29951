#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # notenwerk
//!
//! Command line front end for the grading calculus: grades a measurement
//! against a stored grading configuration, or analyses a corrected exam.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use notenwerk::{
    GradingConfig, Measurement, Settings,
    analysis::{
        Exam, ExamResult, ExamStatistics, Outliers, PointAdjustmentSuggestion, RiskLevel,
        StudentRisk, TaskVariance, analyze_exam_difficulty, calculate_task_variance,
        identify_outliers, identify_students_at_risk, suggest_point_adjustments,
    },
    report,
};
use serde::{Deserialize, Serialize};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a measurement against a grading configuration
    Grade {
        /// Print JSON instead of tables
        json:        bool,
        /// Path to the grading configuration
        config:      PathBuf,
        /// Path to the measurement
        measurement: PathBuf,
    },
    /// Analyse a corrected exam
    Exam {
        /// Print JSON instead of tables
        json:     bool,
        /// Difficulty index to aim for
        target:   Option<f64>,
        /// Risk threshold in percent
        risk:     Option<f64>,
        /// Outlier threshold
        outliers: Option<f64>,
        /// Path to the exam file
        file:     PathBuf,
    },
}

/// Global flags plus the chosen command.
#[derive(Debug, Clone)]
struct Cli {
    /// Log grading decisions
    verbose: bool,
    /// The command to run
    cmd:     Cmd,
}

/// Contents of an exam file.
#[derive(Debug, Deserialize)]
struct ExamFile {
    /// The exam and its tasks
    exam:    Exam,
    /// Corrected results
    #[serde(default)]
    results: Vec<ExamResult>,
}

/// Everything the `exam` command reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExamReport {
    /// Exam-wide and per-task statistics
    statistics:        ExamStatistics,
    /// Very difficult and very easy tasks
    outliers:          Outliers,
    /// Students below the risk threshold
    students_at_risk:  Vec<StudentRisk>,
    /// Spread of attempted scores per task
    task_variance:     Vec<TaskVariance>,
    /// Suggested point redistribution
    point_adjustments: PointAdjustmentSuggestion,
}

/// Parse the command line arguments and return the `Cli`
fn options() -> Cli {
    /// parses the `--json` switch
    fn json() -> impl Parser<bool> {
        long("json")
            .help("Print the result as JSON instead of tables")
            .switch()
    }

    let config = positional::<PathBuf>("CONFIG").help("Grading configuration (JSON)");
    let measurement = positional::<PathBuf>("MEASUREMENT").help("Measurement to grade (JSON)");
    let grade = {
        let json = json();
        construct!(Cmd::Grade {
            json,
            config,
            measurement
        })
        .to_options()
        .command("grade")
        .help("Grade a measurement against a grading configuration")
    };

    let exam = {
        let json = json();
        let target = long("target")
            .help("Difficulty index point adjustments aim for")
            .argument::<f64>("INDEX")
            .optional();
        let risk = long("risk")
            .help("Percentage below which students are at risk")
            .argument::<f64>("PERCENT")
            .optional();
        let outliers = long("outliers")
            .help("Distance from the mean difficulty that marks an outlier")
            .argument::<f64>("THRESHOLD")
            .optional();
        let file = positional::<PathBuf>("FILE").help("Exam and results (JSON)");
        construct!(Cmd::Exam {
            json,
            target,
            risk,
            outliers,
            file
        })
        .to_options()
        .command("exam")
        .help("Print statistics and point adjustment suggestions for an exam")
    };

    let verbose = short('v')
        .long("verbose")
        .help("Log grading decisions")
        .switch();
    let cmd = construct!([grade, exam]);

    construct!(Cli { verbose, cmd })
        .to_options()
        .descr("Grade calculus for classroom management")
        .run()
}

/// Reads a file to a string with a helpful error.
fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

/// Runs the `grade` command.
fn grade(json: bool, config: &Path, measurement: &Path) -> Result<()> {
    let config = GradingConfig::from_json(&read(config)?)
        .with_context(|| format!("Invalid grading configuration in {}", config.display()))?;
    let measurement = Measurement::from_json(&read(measurement)?)
        .with_context(|| format!("Invalid measurement in {}", measurement.display()))?;

    let outcome = config.grade(&measurement)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", report::render_outcome(&outcome));
    }
    Ok(())
}

/// Runs the `exam` command.
fn exam(json: bool, settings: Settings, file: &Path) -> Result<()> {
    let ExamFile { exam, results } = serde_json::from_str(&read(file)?)
        .with_context(|| format!("Could not parse exam file {}", file.display()))?;

    let statistics = analyze_exam_difficulty(&exam, &results);
    let summary = ExamReport {
        outliers: identify_outliers(&statistics, settings.outlier_threshold()),
        students_at_risk: identify_students_at_risk(&results, settings.risk_threshold()),
        task_variance: calculate_task_variance(&results, &exam),
        point_adjustments: suggest_point_adjustments(
            &exam,
            &results,
            settings.target_difficulty(),
        )?,
        statistics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", report::render_exam_statistics(&summary.statistics));
    println!("{}", report::render_outliers(&summary.outliers));

    let critical = summary
        .students_at_risk
        .iter()
        .filter(|s| s.risk_level == RiskLevel::Critical)
        .count();
    let warning = summary.students_at_risk.len() - critical;
    eprintln!(
        "{} critical, {} warning",
        critical.to_string().red().bold(),
        warning.to_string().yellow()
    );
    println!("{}", report::render_students_at_risk(&summary.students_at_risk));
    println!("{}", report::render_task_variance(&summary.task_variance));
    println!("{}", report::render_point_adjustments(&summary.point_adjustments));
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match opts.cmd {
        Cmd::Grade {
            json,
            config,
            measurement,
        } => grade(json, &config, &measurement),
        Cmd::Exam {
            json,
            target,
            risk,
            outliers,
            file,
        } => {
            let mut settings = Settings::from_env();
            if let Some(target) = target {
                settings = settings.set_target_difficulty(target);
            }
            if let Some(risk) = risk {
                settings = settings.set_risk_threshold(risk);
            }
            if let Some(outliers) = outliers {
                settings = settings.set_outlier_threshold(outliers);
            }
            exam(json, settings, &file)
        }
    }
}
