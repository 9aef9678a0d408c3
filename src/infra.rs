//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Regression Runner,
//! including process launching, path helpers, diagnostics logging and i18n support.
//!
//! 此模块为 Regression Runner 提供基础设施服务，
//! 包括进程启动、路径辅助函数、诊断日志和国际化支持。

pub mod command;
pub mod fs;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
