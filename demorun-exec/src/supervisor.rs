//! Child Process Supervision
//!
//! Owns one example's child process from spawn to reap. The child leads its own
//! process group so signals reach anything it started. Termination is graceful
//! first (SIGTERM to the group), then forced (SIGKILL) once the grace window
//! runs out. The guard kills and reaps on drop, so no early return can leave a
//! child running.

use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Interval between liveness checks while waiting on a child
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace window used when a guard is dropped with a live child
const DROP_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to spawn {}: {source}", program.display())]
    SpawnFailed {
        program: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for child process: {0}")]
    WaitFailed(#[source] io::Error),
}

/// How a bounded wait ended
#[derive(Debug)]
pub enum WaitResult {
    /// Child exited on its own
    Exited(ExitStatus),
    /// Deadline passed with the child still running
    TimedOut,
}

/// Send `signal` to the process group led by `pid`
fn signal_group(pid: u32, signal: libc::c_int) -> Result<(), io::Error> {
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Scoped handle on a spawned example process
pub struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    /// Spawn `program script` with piped output and inherited working directory
    pub fn spawn(program: &Path, script: &Path) -> Result<Self, SupervisorError> {
        let child = Command::new(program)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|source| SupervisorError::SpawnFailed {
                program: program.to_path_buf(),
                source,
            })?;

        tracing::debug!(pid = child.id(), "Spawned {} {}", program.display(), script.display());

        Ok(Self {
            child,
            reaped: false,
        })
    }

    /// OS process id of the child
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Take the output pipes. Subsequent calls return `None`.
    pub fn take_output(&mut self) -> (Option<ChildStdout>, Option<ChildStderr>) {
        (self.child.stdout.take(), self.child.stderr.take())
    }

    /// Check whether the child has exited without blocking.
    ///
    /// Once the child has exited, whatever is left of its process group is
    /// killed before the child is reaped.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, SupervisorError> {
        if self.reaped {
            return Ok(None);
        }
        if !self.leader_exited().map_err(SupervisorError::WaitFailed)? {
            return Ok(None);
        }
        // The unreaped leader keeps its pid, and so the group id, reserved
        self.kill_group();
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.reaped = true;
                Ok(Some(status))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(SupervisorError::WaitFailed(e)),
        }
    }

    /// Whether the child is still running
    pub fn is_alive(&mut self) -> bool {
        !self.reaped && matches!(self.try_wait(), Ok(None))
    }

    /// Wait for the child to exit, giving up after `timeout`.
    ///
    /// A timeout too large to express as an `Instant` waits without a deadline.
    pub fn wait_for(&mut self, timeout: Duration) -> Result<WaitResult, SupervisorError> {
        self.wait_deadline(Instant::now().checked_add(timeout))
    }

    /// Wait for the child to exit, giving up at `deadline`
    pub fn wait_until(&mut self, deadline: Instant) -> Result<WaitResult, SupervisorError> {
        self.wait_deadline(Some(deadline))
    }

    fn wait_deadline(&mut self, deadline: Option<Instant>) -> Result<WaitResult, SupervisorError> {
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(WaitResult::Exited(status));
            }

            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(WaitResult::TimedOut);
                    }
                    remaining.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            std::thread::sleep(pause);
        }
    }

    /// Peek at the child's exit without reaping it
    fn leader_exited(&self) -> io::Result<bool> {
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            libc::waitid(
                libc::P_PID,
                self.child.id() as libc::id_t,
                &mut info,
                libc::WEXITED | libc::WNOHANG | libc::WNOWAIT,
            )
        };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        // si_signo stays zero while the child is still running
        Ok(info.si_signo == libc::SIGCHLD)
    }

    /// Kill whatever is left of the child's process group
    fn kill_group(&self) {
        match signal_group(self.child.id(), libc::SIGKILL) {
            Ok(()) => {}
            Err(e) if e.raw_os_error() == Some(libc::ESRCH) => {}
            Err(e) => tracing::debug!(pid = self.child.id(), "Group SIGKILL failed: {}", e),
        }
    }

    /// Terminate the child and its group: SIGTERM, wait up to `grace`, then SIGKILL.
    ///
    /// Always reaps the child before returning. Returns the exit status when
    /// the child exited within the grace window.
    pub fn terminate(&mut self, grace: Duration) -> Option<ExitStatus> {
        if self.reaped {
            return None;
        }
        let pid = self.child.id();

        // The child may have exited between the last poll and now
        if let Err(e) = signal_group(pid, libc::SIGTERM) {
            tracing::debug!(pid, "SIGTERM not delivered: {}", e);
        }

        // Once the leader exits, try_wait SIGKILLs the rest of the group
        if let Ok(WaitResult::Exited(status)) = self.wait_for(grace) {
            return Some(status);
        }

        tracing::debug!(pid, "Grace period elapsed, sending SIGKILL");
        let _ = signal_group(pid, libc::SIGKILL);
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(_) => {
                self.reaped = true;
            }
            Err(e) => {
                tracing::warn!(pid, "Failed to reap child: {}", e);
            }
        }
        None
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.is_alive() {
            self.terminate(DROP_GRACE);
        }
    }
}
