//! # File System Module / 文件系统模块
//!
//! Path helpers used to resolve the suite file and the per-case working
//! directories.
//!
//! 用于解析套件文件和各用例工作目录的路径辅助函数。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Checks if a path exists and is a directory.
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a directory, `false` otherwise
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Determines the directory that case `config_dir`s are relative to:
/// the explicit `cases_dir` if given, otherwise the directory holding the
/// suite file.
///
/// 确定用例 `config_dir` 的相对基准目录：如果给出了 `cases_dir` 则使用它，
/// 否则使用套件文件所在的目录。
pub fn resolve_cases_root(suite_path: &Path, cases_dir: Option<&Path>) -> Result<PathBuf> {
    let root = match cases_dir {
        Some(dir) => absolute_path(dir)?,
        None => absolute_path(suite_path)?
            .parent()
            .map(Path::to_path_buf)
            .context("Suite file has no parent directory")?,
    };

    if !is_directory(&root) {
        anyhow::bail!("Cases directory is not a directory: {}", root.display());
    }
    Ok(root)
}

/// The working directory of one case.
pub fn case_working_dir(cases_root: &Path, config_dir: &Path) -> PathBuf {
    cases_root.join(config_dir)
}
