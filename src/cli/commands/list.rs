//! The `list` command: validates a suite file and prints its cases.
//! `list` 命令：校验套件文件并打印其中的用例。

use anyhow::Result;
use std::path::Path;

use crate::core::config::{load_test_suite, TestCase};
use crate::infra::t;

/// Loads the suite at `config` and prints one line per case.
pub fn execute(config: &Path) -> Result<u8> {
    let suite = load_test_suite(config)?;

    println!(
        "{}",
        t!("list_header", path = config.display(), count = suite.cases.len())
    );
    for case in &suite.cases {
        println!("{}", describe_case(case));
    }
    Ok(0)
}

/// One-line description of a case, e.g.
/// `channel  euler/channel/inv_channel_RK.cfg  iter=20  values=4  tol=0.00001  [unsteady]`.
/// A wider extraction shows as `values=3 (extract 4)`.
pub fn describe_case(case: &TestCase) -> String {
    let mut flags = Vec::new();
    if case.is_unsteady() {
        flags.push("unsteady");
    }
    if case.is_multizone() {
        flags.push("multizone");
    }
    if case.restart_expected() {
        flags.push("restart");
    }
    flags.push(case.output_format().name());

    let references = case.expected_values().len();
    let values = if case.expected_value_count() == references {
        references.to_string()
    } else {
        format!("{references} (extract {})", case.expected_value_count())
    };

    format!(
        "{:<32} {:<56} iter={:<6} values={:<3} tol={}  [{}]",
        case.tag(),
        case.config_dir().join(case.config_file()).display().to_string(),
        case.test_iter(),
        values,
        case.tolerance(),
        flags.join(", ")
    )
}
