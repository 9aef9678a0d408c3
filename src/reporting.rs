//! # Reporting Module / 报告模块
//!
//! This module prints run results to the console: a detail block for every
//! failed case followed by the fixed-format suite summary.
//!
//! 此模块将运行结果打印到控制台：每个失败用例的详细信息，
//! 以及固定格式的测试套件摘要。

pub mod console;

// Re-export common reporting functions
pub use console::{exit_code, format_summary, print_failure_details, print_summary};
