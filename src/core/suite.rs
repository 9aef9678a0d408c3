//! # Suite Driver Module / 测试套件驱动模块
//!
//! Selects the cases to run and evaluates them, sequentially or with a bounded
//! number of concurrent solver processes. Results always come back in
//! declaration order. Printing and exit codes live in `reporting`.
//!
//! 选择要运行的用例并对其进行评估，可顺序执行，也可限制并发求解器进程数量。
//! 结果总是按声明顺序返回。打印和退出码在 `reporting` 模块中处理。

use anyhow::{bail, Result};
use futures::{stream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::{config::TestCase, execution::run_test_case, models::RunResult};

/// How a suite is evaluated.
/// 测试套件的评估方式。
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Maximum number of cases running at the same time (at least 1).
    /// 同时运行的最大用例数量（至少为 1）。
    pub jobs: usize,
    /// Directory the cases' `config_dir`s are relative to.
    /// 用例 `config_dir` 的相对基准目录。
    pub cases_root: PathBuf,
}

/// Resolves the `--jobs` argument: absent means sequential, `0` means one job
/// per CPU core.
pub fn effective_jobs(jobs: Option<usize>) -> usize {
    match jobs {
        None => 1,
        Some(0) => num_cpus::get(),
        Some(n) => n,
    }
}

/// Restricts `cases` to the tags in `only`, keeping declaration order.
/// An empty `only` keeps every case; an unknown tag is an error.
///
/// 将 `cases` 限制为 `only` 中的标签，并保持声明顺序。
/// `only` 为空时保留所有用例；未知标签会返回错误。
pub fn select_cases(cases: Vec<TestCase>, only: &[String]) -> Result<Vec<TestCase>> {
    if only.is_empty() {
        return Ok(cases);
    }

    let wanted: HashSet<&str> = only.iter().map(String::as_str).collect();
    let known: HashSet<&str> = cases.iter().map(TestCase::tag).collect();
    let mut unknown: Vec<&str> = wanted.difference(&known).copied().collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        bail!("Unknown test case tag(s): {}", unknown.join(", "));
    }

    Ok(cases
        .into_iter()
        .filter(|case| wanted.contains(case.tag()))
        .collect())
}

/// Runs every case and returns one result per case, in the order given.
///
/// Cases share no state; up to `options.jobs` solver processes run at once.
/// A case that fails is reported in its result and never stops the others.
/// Only an infrastructure error (a solver that cannot be launched) aborts the
/// suite; the processes still in flight are killed when their futures drop.
///
/// 运行每个用例，并按给定顺序为每个用例返回一个结果。
/// 用例之间不共享状态；最多同时运行 `options.jobs` 个求解器进程。
/// 只有基础设施错误（无法启动求解器）才会中止整个套件。
pub async fn run_suite(cases: Vec<TestCase>, options: &SuiteOptions) -> Result<Vec<RunResult>> {
    let jobs = options.jobs.max(1);
    tracing::debug!(cases = cases.len(), jobs, "running suite");

    stream::iter(
        cases
            .into_iter()
            .map(|case| run_test_case(case, &options.cases_root)),
    )
    .buffered(jobs)
    .try_collect()
    .await
}
