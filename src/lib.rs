//! # Regression Runner Library / 回归测试运行器库
//!
//! This library provides the core functionality for the Regression Runner tool,
//! a configuration-driven harness that launches a numerical solver, locates a
//! row of its convergence log and grades the reported values against stored
//! reference values.
//!
//! 此库为 Regression Runner 工具提供核心功能，
//! 这是一个配置驱动的回归测试工具：启动数值求解器，定位其收敛日志中的某一行，
//! 并将输出值与参考值进行比较。
//!
//! ## Modules / 模块
//!
//! - `core` - Test case declarations, log parsing, comparison and the run engine
//! - `infra` - Infrastructure services like process launching and logging
//! - `reporting` - Console reporting of run results
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 测试用例声明、日志解析、数值比较和运行引擎
//! - `infra` - 基础设施服务，如进程启动和日志
//! - `reporting` - 运行结果的控制台报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::compare;
pub use core::config;
pub use core::convergence;
pub use core::execution;
pub use core::models;
pub use core::suite;

/// Picks the UI language from the system locale.
///
/// The full locale (e.g. "zh-CN") is tried first, then the bare language
/// code (e.g. "en" from "en-US"), then "en".
pub fn detect_language() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        return locale;
    }
    locale
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
