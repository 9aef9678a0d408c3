//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Regression Runner:
//! case declarations, convergence log parsing, the tolerance policy,
//! single-case execution and suite evaluation.
//!
//! 此模块包含 Regression Runner 的核心功能：
//! 用例声明、收敛日志解析、容差策略、单个用例执行和测试套件评估。

pub mod compare;
pub mod config;
pub mod convergence;
pub mod execution;
pub mod models;
pub mod suite;

// Re-exports
pub use config::{TestCase, TestSuite};
pub use execution::run_test_case;
pub use models::{FailureReason, RunResult};
pub use suite::{run_suite, SuiteOptions};
