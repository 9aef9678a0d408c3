//! # Comparison Module / 数值比较模块
//!
//! The tolerance policy applied to every graded value. Expected values whose
//! magnitude is below the tolerance (or exactly zero) are checked with an
//! absolute difference; all others with a relative difference.
//!
//! 应用于每个被检查数值的容差策略。期望值的绝对值小于容差（或恰好为零）时
//! 使用绝对误差检查，其余情况使用相对误差检查。

use serde::Serialize;

/// Which rule decided a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceRule {
    /// `|extracted - expected| <= tolerance`
    Absolute,
    /// `|extracted - expected| / |expected| <= tolerance`
    Relative,
}

/// The outcome of comparing one extracted value against its reference.
/// 单个提取值与参考值比较的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueComparison {
    pub expected: f64,
    pub extracted: f64,
    /// Absolute difference `|extracted - expected|`.
    pub delta: f64,
    pub rule: ToleranceRule,
    pub passed: bool,
}

/// Selects the rule used for an expected value.
pub fn rule_for(expected: f64, tolerance: f64) -> ToleranceRule {
    if expected == 0.0 || expected.abs() < tolerance {
        ToleranceRule::Absolute
    } else {
        ToleranceRule::Relative
    }
}

/// Returns `true` if `extracted` matches `expected` within `tolerance`.
///
/// A NaN on either side never passes.
///
/// 如果 `extracted` 在 `tolerance` 范围内与 `expected` 匹配，则返回 `true`。
pub fn within_tolerance(expected: f64, extracted: f64, tolerance: f64) -> bool {
    let delta = (extracted - expected).abs();
    match rule_for(expected, tolerance) {
        ToleranceRule::Absolute => delta <= tolerance,
        ToleranceRule::Relative => delta / expected.abs() <= tolerance,
    }
}

/// Compares the two sequences pair by pair.
///
/// Every pair is evaluated even after a failure so that the report can show
/// all deltas. Callers must check lengths first; extra elements on either side
/// are ignored.
///
/// 逐对比较两个序列。即使出现失败也会评估所有数值对，以便报告显示全部差值。
pub fn compare_values(expected: &[f64], extracted: &[f64], tolerance: f64) -> Vec<ValueComparison> {
    expected
        .iter()
        .zip(extracted)
        .map(|(&expected, &extracted)| ValueComparison {
            expected,
            extracted,
            delta: (extracted - expected).abs(),
            rule: rule_for(expected, tolerance),
            passed: within_tolerance(expected, extracted, tolerance),
        })
        .collect()
}

/// `true` if every comparison passed.
pub fn all_passed(comparisons: &[ValueComparison]) -> bool {
    comparisons.iter().all(|c| c.passed)
}
