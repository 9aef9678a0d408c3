//! # Suite Configuration Module / 测试套件配置模块
//!
//! Test cases are declared in a TOML suite file. Each `[[cases]]` entry is
//! deserialized into a [`CaseDeclaration`] and resolved, together with the
//! suite-wide `[defaults]` table and the current CPU architecture, into an
//! immutable [`TestCase`].
//!
//! 测试用例在 TOML 套件文件中声明。每个 `[[cases]]` 条目被反序列化为
//! [`CaseDeclaration`]，再结合套件级 `[defaults]` 表和当前 CPU 架构，
//! 解析为不可变的 [`TestCase`]。
//!
//! ```toml
//! language = "en"
//!
//! [defaults]
//! executable = "SU2_CFD -t 2"
//! timeout_secs = 600
//! tolerance = 0.00001
//!
//! [[cases]]
//! tag = "channel"
//! config_dir = "euler/channel"
//! config_file = "inv_channel_RK.cfg"
//! test_iter = 20
//! expected_values = [-2.667326, 2.797439, 0.018717, 0.006906]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::convergence::{OutputFormat, RowLayout};

/// Solver invocation used when neither the case nor the suite names one.
pub const DEFAULT_EXECUTABLE: &str = "SU2_CFD";
/// Comparison tolerance used when neither the case nor the suite sets one.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-5;
/// Wall-clock budget used when neither the case nor the suite sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// A single `[[cases]]` entry exactly as written in the suite file.
/// Optional fields fall back to the suite `[defaults]` table, then to the
/// crate-level defaults.
///
/// 套件文件中书写的单个 `[[cases]]` 条目。
/// 可选字段先回退到套件的 `[defaults]` 表，再回退到内置默认值。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CaseDeclaration {
    /// Unique name of the case, used in every report line.
    /// 用例的唯一名称，用于每一行报告。
    pub tag: String,
    /// Directory holding the solver configuration, relative to the cases root.
    /// 存放求解器配置的目录，相对于用例根目录。
    pub config_dir: PathBuf,
    /// Configuration file name passed to the solver as its last argument.
    /// 作为最后一个参数传递给求解器的配置文件名。
    pub config_file: String,
    /// Solver program plus concurrency directive, e.g. `"SU2_CFD -t 2"`.
    #[serde(default)]
    pub executable: Option<String>,
    /// Iteration whose convergence row is graded.
    /// 需要检查其收敛行的迭代号。
    pub test_iter: u64,
    /// Reference values for the graded row.
    /// 被检查行的参考值。
    pub expected_values: Vec<f64>,
    /// Reference values that replace `expected_values` on a given CPU
    /// architecture (keys as in `std::env::consts::ARCH`).
    /// 在特定 CPU 架构上替换 `expected_values` 的参考值。
    #[serde(default)]
    pub expected_values_by_arch: BTreeMap<String, Vec<f64>>,
    /// Number of values to extract; defaults to the number of expected values.
    #[serde(default)]
    pub expected_value_count: Option<usize>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub unsteady: bool,
    #[serde(default)]
    pub multizone: bool,
    /// `true` (default) for the pipe-delimited screen output, `false` for the
    /// legacy whitespace-separated columns.
    #[serde(default)]
    pub new_output: Option<bool>,
    /// The case resumes from a previous solution. Informational only.
    #[serde(default)]
    pub restart: bool,
    /// Header names of the delimited columns to grade, in order.
    #[serde(default)]
    pub value_columns: Vec<String>,
}

/// Suite-wide fallbacks for the optional case fields.
/// 可选用例字段的套件级默认值。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteDefaults {
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// The suite file as deserialized, before any case is resolved.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    defaults: SuiteDefaults,
    #[serde(default)]
    cases: Vec<CaseDeclaration>,
}

fn default_language() -> String {
    "en".to_string()
}

/// A fully resolved, validated test case. Built once by
/// [`TestCase::from_declaration`] and read-only afterwards.
///
/// 一个已解析并校验的测试用例。由 [`TestCase::from_declaration`]
/// 一次性构建，之后只读。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    tag: String,
    config_dir: PathBuf,
    config_file: String,
    executable: String,
    test_iter: u64,
    expected_values: Vec<f64>,
    expected_value_count: usize,
    tolerance: f64,
    timeout_secs: u64,
    unsteady: bool,
    multizone: bool,
    output_format: OutputFormat,
    restart: bool,
    value_columns: Vec<String>,
}

impl TestCase {
    /// Resolves a declaration against the suite defaults for the given CPU
    /// architecture and checks the case invariants.
    ///
    /// 根据给定 CPU 架构和套件默认值解析用例声明，并检查用例不变量。
    pub fn from_declaration(
        declaration: CaseDeclaration,
        defaults: &SuiteDefaults,
        arch: &str,
    ) -> Result<Self> {
        let CaseDeclaration {
            tag,
            config_dir,
            config_file,
            executable,
            test_iter,
            expected_values,
            mut expected_values_by_arch,
            expected_value_count,
            tolerance,
            timeout_secs,
            unsteady,
            multizone,
            new_output,
            restart,
            value_columns,
        } = declaration;

        if tag.trim().is_empty() {
            bail!("test case tag must not be empty");
        }
        if config_file.trim().is_empty() {
            bail!("case '{tag}': config_file must not be empty");
        }

        let expected_values = expected_values_by_arch
            .remove(arch)
            .unwrap_or(expected_values);
        if expected_values.is_empty() {
            bail!("case '{tag}': expected_values must not be empty");
        }
        if let Some(bad) = expected_values.iter().find(|v| !v.is_finite()) {
            bail!("case '{tag}': expected value {bad} is not finite");
        }

        let tolerance = tolerance
            .or(defaults.tolerance)
            .unwrap_or(DEFAULT_TOLERANCE);
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!("case '{tag}': tolerance must be a finite, non-negative number (got {tolerance})");
        }

        let timeout_secs = timeout_secs
            .or(defaults.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("case '{tag}': timeout_secs must be greater than zero");
        }

        let executable = executable
            .or_else(|| defaults.executable.clone())
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());
        if executable.trim().is_empty() {
            bail!("case '{tag}': executable must not be empty");
        }

        let expected_value_count = expected_value_count.unwrap_or(expected_values.len());
        if expected_value_count == 0 {
            bail!("case '{tag}': expected_value_count must be greater than zero");
        }
        if expected_value_count < expected_values.len() {
            bail!(
                "case '{tag}': expected_value_count ({expected_value_count}) is smaller than the number of expected values ({})",
                expected_values.len()
            );
        }

        let output_format = if new_output.unwrap_or(true) {
            OutputFormat::Delimited
        } else {
            OutputFormat::Legacy
        };
        if !value_columns.is_empty() {
            if output_format != OutputFormat::Delimited {
                bail!("case '{tag}': value_columns requires the delimited output format");
            }
            if value_columns.len() != expected_value_count {
                bail!(
                    "case '{tag}': value_columns names {} columns but {} values are extracted",
                    value_columns.len(),
                    expected_value_count
                );
            }
        }

        Ok(Self {
            tag,
            config_dir,
            config_file,
            executable,
            test_iter,
            expected_values,
            expected_value_count,
            tolerance,
            timeout_secs,
            unsteady,
            multizone,
            output_format,
            restart,
            value_columns,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// The solver invocation string, without the config file argument.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn test_iter(&self) -> u64 {
        self.test_iter
    }

    pub fn expected_values(&self) -> &[f64] {
        &self.expected_values
    }

    pub fn expected_value_count(&self) -> usize {
        self.expected_value_count
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_unsteady(&self) -> bool {
        self.unsteady
    }

    pub fn is_multizone(&self) -> bool {
        self.multizone
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn restart_expected(&self) -> bool {
        self.restart
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// The row layout the convergence log of this case is parsed with.
    /// 解析此用例收敛日志所用的行布局。
    pub fn row_layout(&self) -> RowLayout {
        RowLayout::new(self.output_format, self.unsteady, self.multizone)
    }
}

/// A loaded suite: the UI language and the resolved cases in declaration order.
/// 已加载的测试套件：界面语言以及按声明顺序排列的已解析用例。
#[derive(Debug, Clone)]
pub struct TestSuite {
    pub language: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Parses suite TOML and resolves every case for `arch`.
    pub fn from_toml_str(content: &str, arch: &str) -> Result<Self> {
        let file: SuiteFile = toml::from_str(content).context("failed to parse suite TOML")?;

        let mut seen = HashSet::new();
        let mut cases = Vec::with_capacity(file.cases.len());
        for (index, declaration) in file.cases.into_iter().enumerate() {
            if !seen.insert(declaration.tag.clone()) {
                bail!("duplicate test case tag '{}'", declaration.tag);
            }
            let case = TestCase::from_declaration(declaration, &file.defaults, arch)
                .with_context(|| format!("invalid test case #{}", index + 1))?;
            cases.push(case);
        }

        Ok(Self {
            language: file.language,
            cases,
        })
    }
}

/// Loads and resolves the suite file at `path` for the current architecture.
///
/// 为当前架构加载并解析 `path` 处的套件文件。
pub fn load_test_suite(path: &Path) -> Result<TestSuite> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read suite file {}", path.display()))?;
    TestSuite::from_toml_str(&content, env::consts::ARCH)
        .with_context(|| format!("failed to load suite file {}", path.display()))
}
