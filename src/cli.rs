//! # Command-Line Interface / 命令行接口
//!
//! Builds the `regression-runner` command with localized help text and
//! dispatches to the `run` and `list` subcommands.
//!
//! 构建带有本地化帮助文本的 `regression-runner` 命令，
//! 并分派到 `run` 和 `list` 子命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::{logging, t};

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    let pos = args.iter().position(|arg| arg == "--lang")?;
    args.get(pos + 1).cloned()
}

fn config_arg(locale: &str) -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("arg_config", locale = locale).to_string())
        .value_name("CONFIG")
        .default_value("TestSuite.toml")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn build_cli(locale: &str) -> Command {
    Command::new("regression-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help(t!("cli_log_level", locale = locale).to_string())
                .value_name("LEVEL")
                .default_value("warn")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("cases-dir")
                        .long("cases-dir")
                        .help(t!("arg_cases_dir", locale = locale).to_string())
                        .value_name("CASES_DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("arg_jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("only")
                        .long("only")
                        .help(t!("arg_only", locale = locale).to_string())
                        .value_name("TAG")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cmd_list_about", locale = locale).to_string())
                .arg(config_arg(locale)),
        )
}

fn config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("TestSuite.toml"))
}

/// Parses the command line and runs the selected subcommand.
///
/// # Returns
/// The process exit code: `0` when every case passed, `1` otherwise.
/// Configuration and infrastructure problems are returned as errors.
///
/// 解析命令行并运行所选子命令。返回进程退出码：所有用例通过时为 `0`，否则为 `1`。
pub async fn run() -> Result<u8> {
    // Pre-parse language and initialize i18n first.
    let explicit_lang = pre_parse_language();
    let language = explicit_lang
        .clone()
        .unwrap_or_else(crate::detect_language);
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    logging::init_logging(log_level)?;

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let args = commands::run::RunArgs {
                config: config_path(run_matches),
                cases_dir: run_matches.get_one::<PathBuf>("cases-dir").cloned(),
                jobs: run_matches.get_one::<usize>("jobs").copied(),
                only: run_matches
                    .get_many::<String>("only")
                    .map(|tags| tags.cloned().collect())
                    .unwrap_or_default(),
                lang: explicit_lang,
            };
            commands::run::execute(args).await
        }
        Some(("list", list_matches)) => commands::list::execute(&config_path(list_matches)),
        // `subcommand_required` makes clap print help and exit before we get here.
        _ => Ok(0),
    }
}
