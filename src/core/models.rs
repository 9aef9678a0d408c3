//! # Data Models Module / 数据模型模块
//!
//! This module defines the outcome of grading one test case: the failure
//! taxonomy and the run result consumed by the suite driver and the reports.
//!
//! 此模块定义了检查单个测试用例的结果：失败原因分类，
//! 以及供套件驱动器和报告使用的运行结果。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::compare::ValueComparison;
use crate::core::config::TestCase;
use crate::infra::t;

/// Enumerates the possible reasons for a test case failure.
/// Every variant is an ordinary outcome of a run, never a fatal error.
///
/// 枚举测试用例失败的可能原因。每个变体都是运行的正常结果，而不是致命错误。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The solver exited with a nonzero status.
    /// 求解器以非零状态退出。
    ProcessNonzeroExit,
    /// The solver exceeded the case's wall-clock budget and was terminated.
    /// 求解器超出用例的时间限制并被终止。
    Timeout,
    /// No convergence row for the graded iteration was found.
    /// 未找到被检查迭代的收敛行。
    OutputNotFound,
    /// The row did not yield exactly the required number of numeric values.
    /// 该行未能恰好提供所需数量的数值。
    ValueCountMismatch,
    /// At least one value differed from its reference by more than the tolerance.
    /// 至少有一个数值与参考值的差异超过容差。
    ToleranceExceeded,
}

impl FailureReason {
    /// Localized, human-readable description.
    pub fn describe(&self, locale: &str) -> String {
        match self {
            FailureReason::ProcessNonzeroExit => t!("reason.process_nonzero_exit", locale = locale),
            FailureReason::Timeout => t!("reason.timeout", locale = locale),
            FailureReason::OutputNotFound => t!("reason.output_not_found", locale = locale),
            FailureReason::ValueCountMismatch => t!("reason.value_count_mismatch", locale = locale),
            FailureReason::ToleranceExceeded => t!("reason.tolerance_exceeded", locale = locale),
        }
        .to_string()
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::ProcessNonzeroExit => "process_nonzero_exit",
            FailureReason::Timeout => "timeout",
            FailureReason::OutputNotFound => "output_not_found",
            FailureReason::ValueCountMismatch => "value_count_mismatch",
            FailureReason::ToleranceExceeded => "tolerance_exceeded",
        };
        f.write_str(name)
    }
}

/// Represents the final result of a single test case run.
/// Created once per run and never modified afterwards.
///
/// 表示单个测试用例运行的最终结果。每次运行创建一次，之后不再修改。
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// The test case that was run / 被运行的测试用例
    pub case: TestCase,
    /// `None` when the case passed / 用例通过时为 `None`
    pub failure_reason: Option<FailureReason>,
    /// Values read from the located row, if extraction succeeded.
    /// 从定位行中读取的数值（如果提取成功）。
    pub extracted_values: Option<Vec<f64>>,
    /// One entry per graded value, including passing ones.
    /// 每个被检查数值一项，包括通过的数值。
    pub comparisons: Vec<ValueComparison>,
    /// Extra explanation for count mismatches.
    pub detail: Option<String>,
    /// The command line as launched, including the config file.
    pub command: String,
    pub working_dir: PathBuf,
    /// Exit code of the solver; `None` when it was killed or timed out.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr of the solver.
    /// 求解器合并后的 stdout 和 stderr。
    pub output: String,
    pub started_at: DateTime<Local>,
    /// Wall clock time of the run / 运行的实际耗时
    pub duration: Duration,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.failure_reason.is_none()
    }

    pub fn tag(&self) -> &str {
        self.case.tag()
    }

    pub fn expected_values(&self) -> &[f64] {
        self.case.expected_values()
    }

    /// Absolute differences of every graded value, in column order.
    pub fn deltas(&self) -> Vec<f64> {
        self.comparisons.iter().map(|c| c.delta).collect()
    }

    /// The last `lines` lines of the captured output.
    /// 捕获输出的最后 `lines` 行。
    pub fn output_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.output.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}
