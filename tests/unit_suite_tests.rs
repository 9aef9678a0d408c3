//! # Suite and Reporting Unit Tests / 套件与报告单元测试
//!
//! Case selection, job resolution, the summary format, exit codes and the
//! run result helpers.
//!
//! 用例选择、并发数解析、摘要格式、退出码以及运行结果辅助方法的测试。

mod common;

use chrono::Local;
use regression_runner::compare::compare_values;
use regression_runner::config::{CaseDeclaration, SuiteDefaults, TestCase};
use regression_runner::models::{FailureReason, RunResult};
use regression_runner::reporting::{exit_code, format_summary};
use regression_runner::suite::{effective_jobs, select_cases};
use std::path::PathBuf;
use std::time::Duration;

fn case(tag: &str) -> TestCase {
    let declaration = CaseDeclaration {
        tag: tag.to_string(),
        config_dir: tag.into(),
        config_file: "case.cfg".to_string(),
        test_iter: 20,
        expected_values: common::CHANNEL_VALUES.to_vec(),
        ..Default::default()
    };
    TestCase::from_declaration(declaration, &SuiteDefaults::default(), "x86_64").unwrap()
}

fn result(tag: &str, failure_reason: Option<FailureReason>) -> RunResult {
    RunResult {
        case: case(tag),
        failure_reason,
        extracted_values: None,
        comparisons: Vec::new(),
        detail: None,
        command: "SU2_CFD case.cfg".to_string(),
        working_dir: PathBuf::from(tag),
        exit_code: Some(0),
        output: String::new(),
        started_at: Local::now(),
        duration: Duration::from_millis(5),
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[test]
    fn test_empty_selection_keeps_everything() {
        let cases = vec![case("a"), case("b")];
        let selected = select_cases(cases.clone(), &[]).unwrap();
        assert_eq!(selected, cases);
    }

    #[test]
    fn test_selection_keeps_declaration_order() {
        let cases = vec![case("a"), case("b"), case("c")];
        let only = vec!["c".to_string(), "a".to_string()];

        let selected = select_cases(cases, &only).unwrap();
        let tags: Vec<&str> = selected.iter().map(TestCase::tag).collect();
        assert_eq!(tags, vec!["a", "c"]);
    }

    #[test]
    fn test_unknown_tags_are_reported() {
        let cases = vec![case("a")];
        let only = vec!["z".to_string(), "a".to_string(), "y".to_string()];

        let err = select_cases(cases, &only).unwrap_err();
        assert_eq!(err.to_string(), "Unknown test case tag(s): y, z");
    }

    #[test]
    fn test_effective_jobs() {
        assert_eq!(effective_jobs(None), 1);
        assert_eq!(effective_jobs(Some(4)), 4);
        assert!(effective_jobs(Some(0)) >= 1);
    }
}

#[cfg(test)]
mod summary_tests {
    use super::*;

    #[test]
    fn test_summary_lines() {
        let results = vec![
            result("channel", None),
            result("naca0012", Some(FailureReason::ToleranceExceeded)),
            result("wedge", None),
        ];
        let summary = format_summary(&results);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "=".repeat(66));
        assert_eq!(lines[1], "Summary of the regression tests");
        assert_eq!(lines[2], "  passed - channel");
        assert_eq!(lines[3], "* FAILED - naca0012");
        assert_eq!(lines[4], "  passed - wedge");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&[]), 0);
        assert_eq!(exit_code(&[result("a", None)]), 0);
        assert_eq!(
            exit_code(&[result("a", None), result("b", Some(FailureReason::Timeout))]),
            1
        );
    }
}

#[cfg(test)]
mod run_result_tests {
    use super::*;

    #[test]
    fn test_output_tail() {
        let mut r = result("a", Some(FailureReason::OutputNotFound));
        r.output = (1..=60).map(|i| format!("line {i}\n")).collect();

        let tail = r.output_tail(3);
        assert_eq!(tail, "line 58\nline 59\nline 60");
        assert_eq!(r.output_tail(100).lines().count(), 60);
    }

    #[test]
    fn test_deltas_follow_comparisons() {
        let mut r = result("a", Some(FailureReason::ToleranceExceeded));
        r.comparisons = compare_values(&[1.0, 2.0], &[1.5, 2.0], 1e-5);

        assert_eq!(r.deltas(), vec![0.5, 0.0]);
        assert_eq!(r.expected_values(), &common::CHANNEL_VALUES[..]);
    }

    #[test]
    fn test_failure_reason_names() {
        assert_eq!(FailureReason::ProcessNonzeroExit.to_string(), "process_nonzero_exit");
        assert_eq!(FailureReason::Timeout.to_string(), "timeout");
        assert_eq!(FailureReason::OutputNotFound.to_string(), "output_not_found");
        assert_eq!(FailureReason::ValueCountMismatch.to_string(), "value_count_mismatch");
        assert_eq!(FailureReason::ToleranceExceeded.to_string(), "tolerance_exceeded");
    }

    #[test]
    fn test_failure_reason_descriptions_are_localized() {
        let en = FailureReason::Timeout.describe("en");
        let zh = FailureReason::Timeout.describe("zh-CN");

        assert!(!en.is_empty());
        assert_ne!(en, zh);
        assert_ne!(en, "reason.timeout");
    }
}
