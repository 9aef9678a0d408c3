//! # Convergence Log Module / 收敛日志模块
//!
//! Locates the row of a solver's convergence table for a given iteration and
//! extracts numeric values from it. Two row layouts are supported:
//!
//! - [`OutputFormat::Delimited`]: screen output where fields are framed by
//!   pipes, e.g. `|        20|  -2.667326|   2.797439|`. Delimited lines whose
//!   iteration field is not a number are table headers.
//! - [`OutputFormat::Legacy`]: fixed-width columns separated by whitespace.
//!
//! Only lines after the first `Begin Solver` banner are examined when the
//! banner is present. When the same iteration is printed more than once (a
//! restart preamble, per-zone tables) the last row wins.
//!
//! 定位求解器收敛表中指定迭代的行，并从中提取数值。支持两种行布局：
//! 以竖线分隔的新格式和以空白分隔的旧格式。如果日志中存在 `Begin Solver`
//! 标记，则只检查其后的行；同一迭代出现多次时以最后一行为准。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Banner the solver prints right before the iteration loop starts.
pub const SOLVER_BANNER: &str = "Begin Solver";

/// The closed set of convergence table layouts.
/// 收敛表布局的封闭集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Whitespace-separated fixed-width columns.
    Legacy,
    /// Pipe-delimited columns.
    Delimited,
}

impl OutputFormat {
    /// Splits a log line into trimmed fields, or returns `None` if the line
    /// cannot be a table row in this layout.
    ///
    /// 将日志行拆分为字段；如果该行不可能是此布局下的表格行，则返回 `None`。
    pub fn split_fields<'a>(&self, line: &'a str) -> Option<Vec<&'a str>> {
        let fields: Vec<&str> = match self {
            OutputFormat::Legacy => line.split_whitespace().collect(),
            OutputFormat::Delimited => {
                let inner = line.trim().strip_prefix('|')?;
                let inner = inner.strip_suffix('|').unwrap_or(inner);
                inner.split('|').map(str::trim).collect()
            }
        };

        if fields.iter().all(|field| field.is_empty()) {
            None
        } else {
            Some(fields)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Legacy => "legacy",
            OutputFormat::Delimited => "delimited",
        }
    }
}

/// Layout plus the column holding the iteration number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub format: OutputFormat,
    pub key_column: usize,
}

impl RowLayout {
    /// Time-accurate single-zone runs print the time iteration first and the
    /// inner iteration second; every other case is keyed on the first field.
    pub fn new(format: OutputFormat, unsteady: bool, multizone: bool) -> Self {
        let key_column = if unsteady && !multizone { 1 } else { 0 };
        Self { format, key_column }
    }
}

/// A table row matched by [`locate_row`].
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedRow<'a> {
    /// 1-based line number within the captured text.
    pub line_number: usize,
    pub line: &'a str,
    pub fields: Vec<&'a str>,
    /// The most recent header row before this row (delimited layout only).
    pub header: Option<Vec<&'a str>>,
}

/// Finds the last row of `text` whose iteration field equals `test_iter`.
///
/// Returns `None` when no row matches; that is an ordinary outcome.
///
/// 查找 `text` 中迭代字段等于 `test_iter` 的最后一行。没有匹配行时返回 `None`。
pub fn locate_row<'a>(text: &'a str, layout: RowLayout, test_iter: u64) -> Option<LocatedRow<'a>> {
    let start = text
        .lines()
        .position(|line| line.contains(SOLVER_BANNER))
        .map_or(0, |banner| banner + 1);

    let mut header: Option<Vec<&'a str>> = None;
    let mut found = None;

    for (index, line) in text.lines().enumerate().skip(start) {
        let Some(fields) = layout.format.split_fields(line) else {
            continue;
        };
        let Some(key) = fields.get(layout.key_column) else {
            continue;
        };

        match key.parse::<u64>() {
            Ok(iteration) if iteration == test_iter => {
                found = Some(LocatedRow {
                    line_number: index + 1,
                    line,
                    fields,
                    header: header.clone(),
                });
            }
            Ok(_) => {}
            Err(_) => {
                if layout.format == OutputFormat::Delimited {
                    header = Some(fields);
                }
            }
        }
    }

    found
}

/// Why a located row could not produce the required values.
/// 已定位的行无法提供所需数值的原因。
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    TooFewFields { available: usize, required: usize },
    MissingHeader,
    UnknownColumn(String),
    NotNumeric { column: usize, token: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::TooFewFields {
                available,
                required,
            } => write!(
                f,
                "row has {available} columns but {required} values are required"
            ),
            ExtractError::MissingHeader => {
                write!(f, "no table header precedes the row, named columns cannot be resolved")
            }
            ExtractError::UnknownColumn(name) => {
                write!(f, "column '{name}' does not appear in the table header")
            }
            ExtractError::NotNumeric { column, token } => {
                write!(f, "column {column} holds '{token}', which is not a number")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extracts `count` values from a located row.
///
/// With no `columns`, the trailing `count` fields are used. Otherwise each
/// name is looked up in the row's header and the fields are returned in the
/// order the names are listed.
///
/// 从已定位的行中提取 `count` 个数值。未指定 `columns` 时使用最后 `count` 个字段；
/// 否则按列名在表头中查找并按列出顺序返回。
pub fn extract_values(
    row: &LocatedRow<'_>,
    count: usize,
    columns: &[String],
) -> Result<Vec<f64>, ExtractError> {
    let indices: Vec<usize> = if columns.is_empty() {
        if row.fields.len() < count {
            return Err(ExtractError::TooFewFields {
                available: row.fields.len(),
                required: count,
            });
        }
        (row.fields.len() - count..row.fields.len()).collect()
    } else {
        let header = row.header.as_ref().ok_or(ExtractError::MissingHeader)?;
        columns
            .iter()
            .map(|name| {
                header
                    .iter()
                    .position(|title| *title == name.as_str())
                    .ok_or_else(|| ExtractError::UnknownColumn(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    indices
        .into_iter()
        .map(|column| {
            let token = row.fields.get(column).ok_or(ExtractError::TooFewFields {
                available: row.fields.len(),
                required: column + 1,
            })?;
            token.parse::<f64>().map_err(|_| ExtractError::NotNumeric {
                column,
                token: (*token).to_string(),
            })
        })
        .collect()
}
