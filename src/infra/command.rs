//! # Process Launcher Module / 进程启动模块
//!
//! Builds the solver command line for a test case, spawns it in the case's
//! directory, merges stdout and stderr into one text buffer and waits for the
//! process within a wall-clock budget.
//!
//! 为测试用例构建求解器命令行，在用例目录中启动进程，将 stdout 和 stderr
//! 合并到一个文本缓冲区，并在时间限制内等待进程结束。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long a timed-out process gets to exit after SIGTERM before it is killed.
pub const TERMINATION_GRACE: Duration = Duration::from_secs(5);

/// How long the pipe readers may keep draining after the process is gone.
/// Grandchildren that inherited the pipes can hold them open indefinitely.
const READER_DRAIN: Duration = Duration::from_secs(2);

/// A fully resolved solver invocation.
/// 一个完全解析的求解器调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl Invocation {
    /// Expands `~` and environment variables in `executable`, splits it with
    /// shell quoting rules and appends `config_file` as the last argument.
    ///
    /// 展开 `executable` 中的 `~` 和环境变量，按 shell 引号规则拆分，
    /// 并将 `config_file` 作为最后一个参数追加。
    pub fn new(
        executable: &str,
        config_file: &str,
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<Self> {
        let expanded = shellexpand::full(executable)
            .with_context(|| format!("Failed to expand command: {executable}"))?
            .to_string();

        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse command: {}", expanded))?;

        if parts.is_empty() {
            anyhow::bail!("Empty command after parsing.");
        }

        let program = parts.remove(0);
        parts.push(config_file.to_string());

        Ok(Self {
            program,
            args: parts,
            working_dir: working_dir.to_path_buf(),
            timeout,
        })
    }

    /// The command line as a single shell-quoted string, for reports.
    pub fn command_line(&self) -> String {
        let words: Vec<&str> = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect();
        shlex::try_join(words.iter().copied()).unwrap_or_else(|_| words.join(" "))
    }
}

/// What happened to one launched process.
/// 一次进程启动的结果。
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Combined stdout and stderr, line by line in arrival order.
    pub output: String,
    /// `None` if the process was terminated by a signal or timed out.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub timed_out: bool,
    pub duration: Duration,
}

/// Launches the solver described by `invocation` and waits for it.
///
/// Only a failure to start the process is an error; a nonzero exit or a
/// timeout is reported through [`ProcessOutcome`].
///
/// 启动 `invocation` 描述的求解器并等待其结束。只有无法启动进程才会返回错误；
/// 非零退出或超时通过 [`ProcessOutcome`] 报告。
pub async fn launch(invocation: &Invocation) -> Result<ProcessOutcome> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    // Own process group, so a timeout or a cancelled run can take down MPI
    // launchers and their workers.
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::debug!(
        command = %invocation.command_line(),
        cwd = %invocation.working_dir.display(),
        timeout_secs = invocation.timeout.as_secs(),
        "launching solver"
    );

    spawn_and_capture(cmd, invocation.timeout)
        .await
        .with_context(|| {
            format!(
                "Failed to launch '{}' in {}",
                invocation.program,
                invocation.working_dir.display()
            )
        })
}

/// Spawns a command, captures its stdout and stderr into one string and waits
/// at most `timeout` for it to exit. A process still running after `timeout`
/// is terminated and whatever it printed so far is returned.
///
/// 派生一个命令，将其 stdout 和 stderr 捕获到一个字符串中，并最多等待
/// `timeout`。超时仍在运行的进程会被终止，并返回其已输出的内容。
pub async fn spawn_and_capture(mut cmd: Command, timeout: Duration) -> Result<ProcessOutcome> {
    let start_time = Instant::now();
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let mut group = ProcessGroupGuard::new(&child);

    let stdout = child
        .stdout
        .take()
        .context("Failed to capture stdout of the child process")?;
    let stderr = child
        .stderr
        .take()
        .context("Failed to capture stderr of the child process")?;

    // Both readers append to the same buffer so the interleaving matches arrival order.
    // 两个读取任务写入同一个缓冲区，使交错顺序与到达顺序一致。
    let output = Arc::new(Mutex::new(String::new()));
    let readers = [
        spawn_reader(stdout, Arc::clone(&output)),
        spawn_reader(stderr, Arc::clone(&output)),
    ];

    let (status, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => (Some(status.context("Failed to wait for the child process")?), false),
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "process timed out, terminating");
            terminate(&mut child).await;
            (None, true)
        }
    };

    // Stray workers of a finished solver would keep the pipes open.
    group.kill_group();

    for mut reader in readers {
        if tokio::time::timeout(READER_DRAIN, &mut reader).await.is_err() {
            reader.abort();
        }
    }

    let output = output.lock().await.clone();
    let duration = start_time.elapsed();

    Ok(ProcessOutcome {
        output,
        exit_code: status.and_then(|s| s.code()),
        success: status.is_some_and(|s| s.success()),
        timed_out,
        duration,
    })
}

/// Reads a stream line by line into `sink`. Invalid UTF-8 is replaced.
fn spawn_reader<R>(stream: R, sink: Arc<Mutex<String>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    let mut sink = sink.lock().await;
                    sink.push_str(text.trim_end_matches(['\n', '\r']));
                    sink.push('\n');
                }
                Err(e) => {
                    tracing::debug!(error = %e, "stopped reading child output");
                    break;
                }
            }
        }
    })
}

/// Terminates a timed-out child: SIGTERM to its process group, then SIGKILL
/// if it has not exited after [`TERMINATION_GRACE`].
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        signal_process_group(libc::SIGTERM, pid);
        if tokio::time::timeout(TERMINATION_GRACE, child.wait()).await.is_ok() {
            return;
        }
        signal_process_group(libc::SIGKILL, pid);
    }

    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "kill on a finished process");
    }
    if tokio::time::timeout(TERMINATION_GRACE, child.wait()).await.is_err() {
        tracing::warn!("child process did not exit after SIGKILL");
    }
}

/// SIGKILLs the child's process group when dropped.
///
/// `kill_on_drop` only reaches the direct child. Workers forked by an MPI
/// launcher live in the same group and would outlive a cancelled run or a
/// suite aborted with cases still in flight.
///
/// 在被丢弃时向子进程所在的进程组发送 SIGKILL，使被取消的运行不会遗留工作进程。
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(child: &Child) -> Self {
        Self { pgid: child.id() }
    }

    /// Kills whatever is left of the group and disarms the guard.
    fn kill_group(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        #[cfg(unix)]
        signal_process_group(libc::SIGKILL, pgid);
        #[cfg(not(unix))]
        let _ = pgid;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill_group();
    }
}

/// Sends `signal` to the process group led by `pgid`.
#[cfg(unix)]
fn signal_process_group(signal: libc::c_int, pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg takes plain integers and touches no memory of ours.
    if unsafe { libc::killpg(pgid, signal) } != 0 {
        let err = std::io::Error::last_os_error();
        // ESRCH: the group is already gone.
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::debug!(error = %err, signal, pgid, "killpg failed");
        }
    }
}
