//! Subcommand implementations / 子命令实现

pub mod list;
pub mod run;
