//! # Console Reporting Module / 控制台报告模块
//!
//! Prints a detail block for every failed case and the fixed-format suite
//! summary, and maps a set of results to the process exit code.
//!
//! 为每个失败用例打印详细信息块以及固定格式的套件摘要，
//! 并将结果集合映射为进程退出码。

use colored::*;
use std::env;

use crate::core::compare::ValueComparison;
use crate::core::models::RunResult;
use crate::infra::t;

/// First header line of the summary.
pub const SUMMARY_RULE: &str =
    "==================================================================";
/// Second header line of the summary.
pub const SUMMARY_TITLE: &str = "Summary of the regression tests";
/// Number of trailing solver output lines shown for a failed case.
pub const FAILURE_LOG_TAIL: usize = 50;

/// Renders the summary: the two header lines, then one line per result in
/// the order given.
///
/// 渲染摘要：两行标题，然后按给定顺序每个结果一行。
///
/// # Output Format / 输出格式
/// ```text
/// ==================================================================
/// Summary of the regression tests
///   passed - channel
/// * FAILED - naca0012
/// ```
pub fn format_summary(results: &[RunResult]) -> String {
    let mut lines = vec![SUMMARY_RULE.to_string(), SUMMARY_TITLE.to_string()];
    lines.extend(results.iter().map(|result| {
        if result.passed() {
            format!("  passed - {}", result.tag())
        } else {
            format!("* FAILED - {}", result.tag())
        }
    }));
    lines.join("\n")
}

/// Prints [`format_summary`] to stdout.
pub fn print_summary(results: &[RunResult]) {
    println!("{}", format_summary(results));
}

/// `0` if every result passed, `1` otherwise.
/// 所有结果都通过时返回 `0`，否则返回 `1`。
pub fn exit_code(results: &[RunResult]) -> u8 {
    if results.iter().all(RunResult::passed) {
        0
    } else {
        1
    }
}

/// Prints detailed information about every failed case: why it failed, how
/// the solver was launched, the graded values and the tail of its output.
///
/// 打印每个失败用例的详细信息：失败原因、求解器的启动方式、
/// 被检查的数值以及其输出的末尾部分。
///
/// # Arguments / 参数
/// * `results` - All results of the suite; passed ones are skipped
///               套件的所有结果；通过的结果会被跳过
/// * `locale` - The language locale to use for messages
///              用于消息的语言区域设置
pub fn print_failure_details(results: &[RunResult], locale: &str) {
    let failures: Vec<&RunResult> = results.iter().filter(|r| !r.passed()).collect();
    if failures.is_empty() {
        return;
    }

    println!(
        "\n{}",
        t!("report.failure_banner", locale = locale, count = failures.len())
            .red()
            .bold()
    );
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        let reason = result
            .failure_reason
            .map(|r| r.describe(locale))
            .unwrap_or_default();
        println!(
            "[{}/{}] {} '{}': {}",
            i + 1,
            failures.len(),
            t!("report.failed_case", locale = locale).red(),
            result.tag().cyan(),
            reason
        );

        let case = &result.case;
        println!("  {:<16} {}", t!("report.command", locale = locale), result.command);
        println!(
            "  {:<16} {}",
            t!("report.working_dir", locale = locale),
            result.working_dir.display()
        );
        println!(
            "  {:<16} {}    tolerance={}    timeout={}s    format={}{}",
            "test_iter",
            case.test_iter(),
            case.tolerance(),
            case.timeout().as_secs(),
            case.output_format().name(),
            case_flags(result)
        );
        println!("  {:<16} {}", t!("report.expected", locale = locale), format_values(result.expected_values()));
        if let Some(values) = &result.extracted_values {
            println!("  {:<16} {}", t!("report.extracted", locale = locale), format_values(values));
        }
        if !result.comparisons.is_empty() {
            println!(
                "  {:<16} {}",
                t!("report.deltas", locale = locale),
                format_deltas(&result.comparisons)
            );
        }
        if let Some(detail) = &result.detail {
            println!("  {:<16} {}", t!("report.detail", locale = locale), detail.yellow());
        }
        if let Some(code) = result.exit_code {
            println!("  {:<16} {}", t!("report.exit_code", locale = locale), code);
        }
        println!(
            "  {:<16} {}    {} {:.2}s    {}",
            t!("report.cpu_arch", locale = locale),
            env::consts::ARCH,
            t!("report.wall_clock", locale = locale),
            result.duration.as_secs_f64(),
            result.started_at.format("%Y-%m-%d %H:%M:%S")
        );

        println!(
            "\n--- {} ---\n",
            t!("report.solver_output", locale = locale, lines = FAILURE_LOG_TAIL).yellow()
        );
        println!("{}", result.output_tail(FAILURE_LOG_TAIL));
        println!("\n{}", "-".repeat(80));
    }
}

fn case_flags(result: &RunResult) -> String {
    let case = &result.case;
    let flags: Vec<&str> = [
        (case.is_unsteady(), "unsteady"),
        (case.is_multizone(), "multizone"),
        (case.restart_expected(), "restart"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();

    if flags.is_empty() {
        String::new()
    } else {
        format!("    [{}]", flags.join(", "))
    }
}

fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failing deltas are highlighted.
fn format_deltas(comparisons: &[ValueComparison]) -> String {
    comparisons
        .iter()
        .map(|c| {
            let delta = format!("{:.6}", c.delta);
            let delta = if c.passed {
                delta.normal()
            } else {
                delta.red().bold()
            };
            delta.to_string()
        })
        .collect::<Vec<_>>()
        .join(", ")
}
