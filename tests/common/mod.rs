// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Reference values of the inviscid channel case.
pub const CHANNEL_VALUES: [f64; 4] = [-2.667326, 2.797439, 0.018717, 0.006906];

/// A legacy (whitespace-separated) convergence log whose 20th row holds
/// `row_20` after the iteration number.
pub fn legacy_log(row_20: &str) -> String {
    format!(
        "\
-------------------------- Solver Preprocessing --------------------------
Reading mesh file: channel.su2
------------------------------ Begin Solver -----------------------------
 Iter    Time(s)     Res[Rho]     Res[RhoE]      CL        CD
    19   0.012345   -2.601123    2.731090   0.018802   0.006911
    20 {row_20}
    21   0.012345   -2.701234    2.830001   0.018650   0.006901
Exit Success (SU2_CFD)
"
    )
}

/// A delimited convergence log with a table header and three rows.
pub fn delimited_log() -> String {
    "\
------------------------------ Begin Solver -----------------------------
+------------------------------------------------------------------+
|  Inner_Iter|   rms[Rho]|  rms[RhoE]|         CL|         CD|
+------------------------------------------------------------------+
|          19|  -2.601123|   2.731090|   0.018802|   0.006911|
|          20|  -2.667326|   2.797439|   0.018717|   0.006906|
|          21|  -2.701234|   2.830001|   0.018650|   0.006901|
"
    .to_string()
}

/// Creates a case directory `config_dir` under `root` holding `config_file`
/// with `contents`. The fake solvers print their last argument, so the
/// "config file" doubles as the canned convergence log.
pub fn write_case_dir(root: &Path, config_dir: &str, config_file: &str, contents: &str) -> PathBuf {
    let dir = root.join(config_dir);
    fs::create_dir_all(&dir).expect("Failed to create case directory");
    fs::write(dir.join(config_file), contents).expect("Failed to write case file");
    dir
}

/// Writes an executable shell script into `dir` and returns its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Failed to make script executable");
    path
}

/// A solver that prints the file named by its last argument.
#[cfg(unix)]
pub fn echo_solver(dir: &Path) -> PathBuf {
    write_script(dir, "echo_solver.sh", "for last; do :; done\ncat \"$last\"")
}

/// A solver that prints a line and exits with status 3.
#[cfg(unix)]
pub fn failing_solver(dir: &Path) -> PathBuf {
    write_script(dir, "failing_solver.sh", "echo 'Error: mesh file not found' >&2\nexit 3")
}

/// A solver that never finishes on its own.
#[cfg(unix)]
pub fn hanging_solver(dir: &Path) -> PathBuf {
    write_script(dir, "hanging_solver.sh", "echo 'Begin Solver'\nsleep 30")
}

/// A launcher that forks a long-running worker, records the worker's pid in
/// `worker.pid` and waits for it, like `mpirun` does with its ranks.
#[cfg(unix)]
pub fn forking_solver(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "forking_solver.sh",
        "sleep 300 &\necho $! > worker.pid\necho 'Begin Solver'\nwait",
    )
}

/// Reads the pid written by [`forking_solver`] into `dir`, waiting for it briefly.
#[cfg(unix)]
pub async fn read_worker_pid(dir: &Path) -> i32 {
    let path = dir.join("worker.pid");
    for _ in 0..50 {
        if let Some(pid) = fs::read_to_string(&path)
            .ok()
            .and_then(|text| text.trim().parse().ok())
        {
            return pid;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("worker pid was never written to {}", path.display());
}

/// `true` while `pid` is a live process. Zombies count as dead.
#[cfg(unix)]
pub fn process_alive(pid: i32) -> bool {
    #[cfg(target_os = "linux")]
    {
        let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
            return false;
        };
        let state = stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next());
        !matches!(state, None | Some('Z') | Some('X'))
    }
    #[cfg(not(target_os = "linux"))]
    {
        unsafe { libc::kill(pid, 0) == 0 }
    }
}

/// Polls until `pid` is gone or `within` has passed.
#[cfg(unix)]
pub async fn wait_for_exit(pid: i32, within: std::time::Duration) -> bool {
    let deadline = std::time::Instant::now() + within;
    while std::time::Instant::now() < deadline {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    !process_alive(pid)
}

/// A scratch directory for solvers, suites and case directories.
pub fn scratch() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Writes `content` as `TestSuite.toml` into `dir`.
pub fn write_suite(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("TestSuite.toml");
    fs::write(&path, content).expect("Failed to write suite file");
    path
}
