//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which loads a suite file, runs
//! the selected cases against the solver and prints the report.
//!
//! 此模块实现了 `run` 命令：加载套件文件，针对求解器运行所选用例并打印报告。

use anyhow::{Context, Result};
use colored::*;
use std::{env, fs, path::Path, path::PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, TestSuite},
        suite::{effective_jobs, run_suite, select_cases, SuiteOptions},
    },
    infra::{fs::resolve_cases_root, t},
    reporting::console::{exit_code, print_failure_details, print_summary},
};

/// Arguments of the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Path to the suite file / 套件文件路径
    pub config: PathBuf,
    /// Directory the cases' `config_dir`s are relative to
    pub cases_dir: Option<PathBuf>,
    /// Number of concurrent solver runs (`0` = one per CPU core)
    pub jobs: Option<usize>,
    /// Restrict the run to these tags
    pub only: Vec<String>,
    /// Language given on the command line; overrides the suite's `language`
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// The exit code of the suite (`0` all passed, `1` otherwise), or an error
/// when the suite could not be loaded or a solver could not be launched.
///
/// 使用提供的参数执行运行命令。返回套件的退出码；
/// 如果无法加载套件或无法启动求解器，则返回错误。
pub async fn execute(args: RunArgs) -> Result<u8> {
    let (suite, config_path) = setup_and_parse_config(&args.config)?;
    let language = args.lang.clone().unwrap_or_else(|| suite.language.clone());
    let locale = language.as_str();
    rust_i18n::set_locale(locale);

    let cases_root = resolve_cases_root(&config_path, args.cases_dir.as_deref())?;

    println!(
        "{}",
        t!("loading_suite", locale = locale, path = config_path.display())
    );
    println!(
        "{}",
        t!("cases_root_detected", locale = locale, path = cases_root.display())
    );
    println!(
        "{}",
        t!(
            "current_platform",
            locale = locale,
            os = env::consts::OS,
            arch = env::consts::ARCH
        )
        .cyan()
    );

    let cases = select_cases(suite.cases, &args.only)?;
    if cases.is_empty() {
        println!("{}", t!("no_cases_to_run", locale = locale).green());
        return Ok(0);
    }

    let jobs = effective_jobs(args.jobs);
    println!(
        "{}",
        t!("running_cases", locale = locale, count = cases.len(), jobs = jobs).bold()
    );

    let stop_token = setup_signal_handler(locale);
    let options = SuiteOptions { jobs, cases_root };

    let results = tokio::select! {
        biased;
        _ = stop_token.cancelled() => {
            anyhow::bail!("{}", t!("run_interrupted", locale = locale));
        }
        results = run_suite(cases, &options) => results?,
    };

    print_failure_details(&results, locale);
    print_summary(&results);

    Ok(exit_code(&results))
}

/// Sets up and parses the suite file.
fn setup_and_parse_config(config_path_arg: &Path) -> Result<(TestSuite, PathBuf)> {
    let config_path = fs::canonicalize(config_path_arg).with_context(|| {
        format!("Failed to read suite file: {}", config_path_arg.display())
    })?;

    let suite = config::load_test_suite(&config_path)?;

    Ok((suite, config_path))
}

/// Sets up a signal handler for graceful shutdown. Cancelling drops the
/// running cases, which kills their solver processes.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("shutdown_signal", locale = locale.as_str()).yellow());
                token_clone.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    token
}
