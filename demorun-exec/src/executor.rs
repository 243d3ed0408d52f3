//! Process Executor
//!
//! Runs one example script under its environment's interpreter and classifies
//! the result. Every failure mode is folded into an `ExecutionOutcome`; nothing
//! is raised past this boundary.
//!
//! ```text
//! script exists? ──no──▶ NotFound
//!      │
//! executable usable? ──no──▶ SpawnError
//!      │
//!   spawn ──err──▶ SpawnError
//!      │
//!  wait ≤ timeout ──expired──▶ SIGTERM → grace → SIGKILL ──▶ Timeout
//!      │
//!  exit 0 ──▶ Success        exit ≠ 0 / signal ──▶ Failure
//! ```

use crate::capture::OutputCapture;
use crate::supervisor::{ChildGuard, WaitResult};
use demorun_core::{BindingTable, ExecutionOutcome, ExecutionRequest, ExecutionStatus};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::{Duration, Instant};

/// Executable location inside an environment root
pub const DEFAULT_INTERPRETER: &str = "bin/python";

/// Executes example scripts as isolated, time-bounded child processes.
///
/// Holds only immutable settings, so one executor can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    interpreter: PathBuf,
    grace_period: Duration,
    drain_window: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl ProcessExecutor {
    /// Create an executor that looks for `interpreter` under each environment root
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            grace_period: Duration::from_millis(500),
            drain_window: Duration::from_millis(500),
        }
    }

    /// Time a timed-out child gets between SIGTERM and SIGKILL
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Time allowed for output pipes to close after the child is gone
    pub fn with_drain_window(mut self, drain: Duration) -> Self {
        self.drain_window = drain;
        self
    }

    /// Relative executable path inside an environment root
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Absolute path of the executable for `environment_root`.
    ///
    /// Relative roots are taken from the current working directory.
    pub fn executable_for(&self, environment_root: &Path) -> PathBuf {
        let executable = environment_root.join(&self.interpreter);
        if executable.is_absolute() {
            return executable;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(executable),
            Err(_) => executable,
        }
    }

    /// Resolve the request's environment through `bindings` and execute it
    pub fn run(&self, request: &ExecutionRequest, bindings: &BindingTable) -> ExecutionOutcome {
        let root = bindings.resolve(&request.unit.identifier);
        tracing::debug!(
            unit = %request.unit.identifier,
            "Resolved environment {}",
            root.display()
        );
        self.execute(root, &request.unit.path, request.timeout)
    }

    /// Run `script_path` with the executable under `environment_root`
    pub fn execute(
        &self,
        environment_root: &Path,
        script_path: &Path,
        timeout: Duration,
    ) -> ExecutionOutcome {
        let call_start = Instant::now();

        if !script_path.exists() {
            return ExecutionOutcome::not_found(
                format!("File {} not found.", script_path.display()),
                call_start.elapsed(),
            );
        }

        let executable = self.executable_for(environment_root);
        if !executable.is_file() {
            return ExecutionOutcome::spawn_error(
                format!(
                    "No usable executable at {} (environment {})",
                    executable.display(),
                    environment_root.display()
                ),
                call_start.elapsed(),
            );
        }

        let started = Instant::now();
        let mut guard = match ChildGuard::spawn(&executable, script_path) {
            Ok(guard) => guard,
            Err(e) => return ExecutionOutcome::spawn_error(e.to_string(), started.elapsed()),
        };

        let (stdout_pipe, stderr_pipe) = guard.take_output();
        let stdout = OutputCapture::start("stdout", stdout_pipe);
        let stderr = OutputCapture::start("stderr", stderr_pipe);

        let waited = guard.wait_for(timeout);
        let (status, exit_code, error) = match waited {
            Ok(WaitResult::Exited(exit)) => classify_exit(exit),
            Ok(WaitResult::TimedOut) => {
                tracing::warn!(
                    pid = guard.id(),
                    "{} did not complete within {:?}, terminating",
                    script_path.display(),
                    timeout
                );
                guard.terminate(self.grace_period);
                (
                    ExecutionStatus::Timeout,
                    None,
                    Some(format!(
                        "Execution did not complete within {:.1}s",
                        timeout.as_secs_f64()
                    )),
                )
            }
            Err(e) => {
                guard.terminate(self.grace_period);
                (ExecutionStatus::SpawnError, None, Some(e.to_string()))
            }
        };
        drop(guard);

        ExecutionOutcome {
            status,
            stdout: stdout.finish(self.drain_window),
            stderr: stderr.finish(self.drain_window),
            exit_code,
            duration_ms: started.elapsed().as_millis() as u64,
            error,
        }
    }
}

fn classify_exit(exit: ExitStatus) -> (ExecutionStatus, Option<i32>, Option<String>) {
    match exit.code() {
        Some(0) => (ExecutionStatus::Success, Some(0), None),
        Some(code) => (ExecutionStatus::Failure, Some(code), None),
        None => {
            let detail = match exit.signal() {
                Some(signal) => format!("Terminated by signal {}", signal),
                None => "Terminated without exit code".to_string(),
            };
            (ExecutionStatus::Failure, None, Some(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demorun_core::{BindingRule, ExampleUnit, UnitPattern};
    use std::fs;

    /// Environment root whose interpreter is a symlink to /bin/sh
    fn shell_env(base: &Path, name: &str) -> PathBuf {
        let root = base.join(name);
        fs::create_dir_all(root.join("bin")).unwrap();
        std::os::unix::fs::symlink("/bin/sh", root.join("bin/python")).unwrap();
        root
    }

    fn script(base: &Path, name: &str, body: &str) -> PathBuf {
        let path = base.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn executor() -> ProcessExecutor {
        ProcessExecutor::default()
            .with_grace_period(Duration::from_millis(200))
            .with_drain_window(Duration::from_millis(200))
    }

    #[test]
    fn test_success_captures_stdout_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let path = script(dir.path(), "ok_example.py", "printf 'hello\\nworld\\n'\n");

        let outcome = executor().execute(&env, &path, Duration::from_secs(10));

        assert_eq!(outcome.status, ExecutionStatus::Success);
        assert_eq!(outcome.stdout, "hello\nworld\n");
        assert_eq!(outcome.stderr, "");
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let path = script(
            dir.path(),
            "bad_example.py",
            "echo partial\necho 'Traceback: boom' >&2\nexit 3\n",
        );

        let outcome = executor().execute(&env, &path, Duration::from_secs(10));

        assert_eq!(outcome.status, ExecutionStatus::Failure);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stderr, "Traceback: boom\n");
        assert_eq!(outcome.stdout, "partial\n");
    }

    #[test]
    fn test_timeout_terminates_child() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let pid_file = dir.path().join("pid");
        let body = format!("echo $$ > {}\necho started\nsleep 60\n", pid_file.display());
        let path = script(dir.path(), "slow_example.py", &body);

        let outcome = executor().execute(&env, &path, Duration::from_secs(1));

        assert_eq!(outcome.status, ExecutionStatus::Timeout);
        assert_eq!(outcome.stdout, "started\n");
        assert!(outcome.exit_code.is_none());
        assert!(outcome.duration_ms >= 1_000);
        assert!(outcome.duration_ms < 5_000, "took {} ms", outcome.duration_ms);

        let pid: i32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        assert_eq!(unsafe { libc::kill(pid, 0) }, -1, "child {} still running", pid);
    }

    #[test]
    fn test_timeout_ignoring_sigterm_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let path = script(dir.path(), "stubborn_example.py", "trap '' TERM\nsleep 60\n");

        let start = Instant::now();
        let outcome = executor().execute(&env, &path, Duration::from_millis(300));

        assert_eq!(outcome.status, ExecutionStatus::Timeout);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_unbounded_timeout_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let path = script(dir.path(), "quick_example.py", "echo done\n");

        let outcome = executor().execute(&env, &path, Duration::MAX);

        assert_eq!(outcome.status, ExecutionStatus::Success);
        assert_eq!(outcome.stdout, "done\n");
    }

    #[test]
    fn test_missing_script_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");

        let outcome = executor().execute(
            &env,
            &dir.path().join("gone_example.py"),
            Duration::from_secs(1),
        );

        assert_eq!(outcome.status, ExecutionStatus::NotFound);
        assert!(outcome.error.unwrap().contains("gone_example.py"));
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(dir.path(), "x_example.py", "echo hi\n");

        let outcome = executor().execute(&dir.path().join("no-env"), &path, Duration::from_secs(1));

        assert_eq!(outcome.status, ExecutionStatus::SpawnError);
        assert!(outcome.error.unwrap().contains("bin/python"));
    }

    #[test]
    fn test_non_executable_interpreter_is_spawn_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");
        fs::create_dir_all(root.join("bin")).unwrap();
        let interpreter = root.join("bin/python");
        fs::write(&interpreter, "not a program").unwrap();
        fs::set_permissions(&interpreter, fs::Permissions::from_mode(0o644)).unwrap();
        let path = script(dir.path(), "x_example.py", "echo hi\n");

        let outcome = executor().execute(&root, &path, Duration::from_secs(1));

        assert_eq!(outcome.status, ExecutionStatus::SpawnError);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_killed_by_signal_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let path = script(dir.path(), "crash_example.py", "kill -9 $$\n");

        let outcome = executor().execute(&env, &path, Duration::from_secs(10));

        assert_eq!(outcome.status, ExecutionStatus::Failure);
        assert!(outcome.exit_code.is_none());
        assert_eq!(outcome.error.as_deref(), Some("Terminated by signal 9"));
    }

    #[test]
    fn test_run_resolves_environment() {
        let dir = tempfile::tempdir().unwrap();
        let bee = shell_env(dir.path(), "venv_bee");
        let pattern = UnitPattern::default();
        let bindings = BindingTable::new(
            vec![BindingRule::new("beeai", &bee)],
            dir.path().join("venv_missing"),
        );

        let bee_path = script(dir.path(), "beeai_example.py", "echo bee\n");
        let other_path = script(dir.path(), "other_example.py", "echo other\n");

        let bee_unit = ExampleUnit::from_path(bee_path, &pattern).unwrap();
        let other_unit = ExampleUnit::from_path(other_path, &pattern).unwrap();

        let exec = executor();
        let outcome = exec.run(
            &ExecutionRequest::new(bee_unit, Duration::from_secs(10)),
            &bindings,
        );
        assert_eq!(outcome.status, ExecutionStatus::Success);
        assert_eq!(outcome.stdout, "bee\n");

        let outcome = exec.run(
            &ExecutionRequest::new(other_unit, Duration::from_secs(10)),
            &bindings,
        );
        assert_eq!(outcome.status, ExecutionStatus::SpawnError);
    }

    #[test]
    fn test_concurrent_executions_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let env = shell_env(dir.path(), "env");
        let exec = executor();

        let paths: Vec<_> = (0..4)
            .map(|i| script(dir.path(), &format!("n{}_example.py", i), &format!("echo {}\n", i)))
            .collect();

        let (exec, env) = (&exec, &env);
        std::thread::scope(|s| {
            let handles: Vec<_> = paths
                .iter()
                .map(|p| s.spawn(move || exec.execute(env, p, Duration::from_secs(10))))
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                let outcome = handle.join().unwrap();
                assert_eq!(outcome.status, ExecutionStatus::Success);
                assert_eq!(outcome.stdout, format!("{}\n", i));
            }
        });
    }

    #[test]
    fn test_executable_for_relative_root() {
        let exec = ProcessExecutor::default();
        let path = exec.executable_for(Path::new(".venv"));
        assert!(path.is_absolute());
        assert!(path.ends_with(".venv/bin/python"));
        assert_eq!(
            exec.executable_for(Path::new("/opt/env")),
            PathBuf::from("/opt/env/bin/python")
        );
    }
}
