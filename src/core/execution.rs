//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! Runs one test case from launch to verdict:
//!
//! ```text
//! launch ─┬─ timed out ──────────────────────────────► Timeout
//!         ├─ nonzero exit ───────────────────────────► ProcessNonzeroExit
//!         └─ output captured ─┬─ no row ─────────────► OutputNotFound
//!                             └─ row ─┬─ bad count ──► ValueCountMismatch
//!                                     └─ values ─┬───► passed
//!                                                └───► ToleranceExceeded
//! ```
//!
//! Every failure is terminal and nothing is retried.
//!
//! 从启动到判定运行单个测试用例。每个失败都是终止状态，不进行任何重试。

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::path::Path;

use crate::{
    core::{
        compare::{all_passed, compare_values, ValueComparison},
        config::TestCase,
        convergence::{extract_values, locate_row},
        models::{FailureReason, RunResult},
    },
    infra::{
        command::{self, Invocation, ProcessOutcome},
        fs::{case_working_dir, is_directory},
        t,
    },
};

/// The verdict on a captured run, before it is combined with launch details.
/// 对已捕获运行的判定结果（尚未与启动信息合并）。
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub failure_reason: Option<FailureReason>,
    pub extracted_values: Option<Vec<f64>>,
    pub comparisons: Vec<ValueComparison>,
    pub detail: Option<String>,
}

impl Grade {
    fn failed(reason: FailureReason, detail: Option<String>) -> Self {
        Self {
            failure_reason: Some(reason),
            extracted_values: None,
            comparisons: Vec::new(),
            detail,
        }
    }
}

/// Runs a single test case: launches the solver in the case directory, then
/// grades its output.
///
/// # Arguments
/// * `case` - The test case to run
/// * `cases_root` - Directory the case's `config_dir` is relative to
///
/// # Returns
/// A `RunResult` for every outcome of the solver run. An `Err` means the
/// solver could not be started at all, which aborts the suite.
///
/// 运行单个测试用例：在用例目录中启动求解器，然后检查其输出。
/// 只有在求解器根本无法启动时才返回 `Err`，这会中止整个测试套件。
pub async fn run_test_case(case: TestCase, cases_root: &Path) -> Result<RunResult> {
    let working_dir = case_working_dir(cases_root, case.config_dir());
    if !is_directory(&working_dir) {
        anyhow::bail!(
            "Config directory of case '{}' does not exist: {}",
            case.tag(),
            working_dir.display()
        );
    }

    let invocation = Invocation::new(
        case.executable(),
        case.config_file(),
        &working_dir,
        case.timeout(),
    )
    .with_context(|| format!("Invalid executable for case '{}'", case.tag()))?;

    println!("{}", t!("run.running_case", tag = case.tag()).blue());

    let started_at = Local::now();
    let outcome = command::launch(&invocation).await?;
    let grade = grade_outcome(&case, &outcome);

    let duration_str = format!("{:.2}", outcome.duration.as_secs_f64());
    match grade.failure_reason {
        None => println!(
            "{}",
            t!("run.case_passed", tag = case.tag(), duration = duration_str).green()
        ),
        Some(FailureReason::Timeout) => println!(
            "{}",
            t!("run.case_timed_out", tag = case.tag(), timeout = case.timeout().as_secs()).red()
        ),
        Some(reason) => println!(
            "{}",
            t!(
                "run.case_failed",
                tag = case.tag(),
                reason = reason.to_string(),
                duration = duration_str
            )
            .red()
        ),
    }

    Ok(RunResult {
        command: invocation.command_line(),
        working_dir,
        exit_code: outcome.exit_code,
        output: outcome.output,
        started_at,
        duration: outcome.duration,
        failure_reason: grade.failure_reason,
        extracted_values: grade.extracted_values,
        comparisons: grade.comparisons,
        detail: grade.detail,
        case,
    })
}

/// Grades a finished (or timed-out) solver run.
/// A run that timed out or exited nonzero is failed without parsing.
///
/// 对已结束（或超时）的求解器运行进行判定。超时或非零退出的运行不解析输出直接判定失败。
pub fn grade_outcome(case: &TestCase, outcome: &ProcessOutcome) -> Grade {
    if outcome.timed_out {
        return Grade::failed(FailureReason::Timeout, None);
    }
    if !outcome.success {
        let detail = match outcome.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by a signal".to_string(),
        };
        return Grade::failed(FailureReason::ProcessNonzeroExit, Some(detail));
    }
    grade_log(case, &outcome.output)
}

/// Locates the graded row in a convergence log, extracts its values and
/// compares them with the case's reference values.
///
/// When `expected_value_count` exceeds the number of reference values, the
/// reference values are matched against the trailing extracted values.
///
/// 在收敛日志中定位被检查的行，提取数值并与参考值比较。
/// 提取数多于参考值时，参考值与末尾的提取值对齐比较。
pub fn grade_log(case: &TestCase, log: &str) -> Grade {
    let Some(row) = locate_row(log, case.row_layout(), case.test_iter()) else {
        tracing::debug!(tag = case.tag(), test_iter = case.test_iter(), "no matching row");
        return Grade::failed(FailureReason::OutputNotFound, None);
    };
    tracing::debug!(
        tag = case.tag(),
        line_number = row.line_number,
        line = row.line,
        "located convergence row"
    );

    let values = match extract_values(&row, case.expected_value_count(), case.value_columns()) {
        Ok(values) => values,
        Err(e) => {
            return Grade::failed(
                FailureReason::ValueCountMismatch,
                Some(format!("line {}: {e}", row.line_number)),
            );
        }
    };

    // Extra leading values are extracted but only the trailing ones are graded.
    let expected = case.expected_values();
    let Some(graded) = values.len().checked_sub(expected.len()).map(|skip| &values[skip..]) else {
        return Grade {
            failure_reason: Some(FailureReason::ValueCountMismatch),
            detail: Some(format!(
                "extracted {} values but {} are expected",
                values.len(),
                expected.len()
            )),
            extracted_values: Some(values),
            comparisons: Vec::new(),
        };
    };

    let comparisons = compare_values(expected, graded, case.tolerance());
    let failure_reason = (!all_passed(&comparisons)).then_some(FailureReason::ToleranceExceeded);

    Grade {
        failure_reason,
        extracted_values: Some(values),
        comparisons,
        detail: None,
    }
}
