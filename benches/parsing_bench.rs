use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use regression_runner::config::{CaseDeclaration, SuiteDefaults, TestCase};
use regression_runner::convergence::{extract_values, locate_row, OutputFormat, RowLayout};
use regression_runner::execution::grade_log;
use regression_runner::infra::command::{launch, Invocation};
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;

const ITERATIONS: u64 = 20_000;
const TEST_ITER: u64 = 19_990;

/// A delimited convergence log with a header repeated every 100 rows.
fn synthetic_log() -> String {
    let mut log = String::from("------------------------------ Begin Solver -----------------------------\n");
    for iter in 0..ITERATIONS {
        if iter % 100 == 0 {
            log.push_str("|  Inner_Iter|   rms[Rho]|  rms[RhoE]|         CL|         CD|\n");
        }
        let x = iter as f64 * 1e-4;
        let _ = writeln!(
            log,
            "|{:>12}|{:>11.6}|{:>11.6}|{:>11.6}|{:>11.6}|",
            iter,
            -2.0 - x,
            2.5 + x,
            0.0187 + x * 1e-3,
            0.0069 - x * 1e-4
        );
    }
    log
}

fn bench_locate_and_extract(c: &mut Criterion) {
    let log = synthetic_log();
    let layout = RowLayout::new(OutputFormat::Delimited, false, false);
    let columns = vec!["CL".to_string(), "CD".to_string()];

    c.bench_function("locate_row", |b| {
        b.iter(|| locate_row(black_box(&log), layout, TEST_ITER))
    });

    c.bench_function("locate_and_extract_named", |b| {
        b.iter(|| {
            let row = locate_row(black_box(&log), layout, TEST_ITER);
            row.and_then(|row| extract_values(&row, 2, &columns).ok())
        })
    });
}

fn bench_grade_log(c: &mut Criterion) {
    let log = synthetic_log();
    let declaration = CaseDeclaration {
        tag: "bench".to_string(),
        config_dir: ".".into(),
        config_file: "bench.cfg".to_string(),
        test_iter: TEST_ITER,
        expected_values: vec![-3.999, 4.499, 0.0207, 0.0067],
        tolerance: Some(1e-2),
        ..Default::default()
    };
    let Ok(case) = TestCase::from_declaration(declaration, &SuiteDefaults::default(), "bench")
    else {
        return;
    };

    c.bench_function("grade_log", |b| b.iter(|| grade_log(&case, black_box(&log))));
}

fn bench_launch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let invocation =
        Invocation::new("echo", "bench.cfg", Path::new("."), Duration::from_secs(10)).unwrap();

    c.bench_function("launch_echo", |b| {
        b.to_async(&rt).iter(|| async {
            let _ = launch(&invocation).await;
        });
    });
}

criterion_group!(benches, bench_locate_and_extract, bench_grade_log, bench_launch);
criterion_main!(benches);
