use crate::error::SandboxError;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A generated program saved to disk, ready to be executed.
pub struct Script<'a> {
    pub path: &'a Path,
    pub source: &'a str,
}

/// What a finished program produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl Execution {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The capability to run a generated program with some standard input.
///
/// Implementations must be shareable across threads: samples execute in
/// parallel and `cancel_current` may be called from another thread while an
/// execution is in flight.
pub trait Sandbox: Send + Sync {
    fn execute(&self, script: &Script<'_>, stdin: &str) -> Result<Execution, SandboxError>;

    /// Kills the most recently started execution if it is still running.
    /// Returns `true` iff a running process was killed.
    fn cancel_current(&self) -> bool {
        false
    }
}

type SharedChild = Arc<Mutex<Child>>;

/// Runs scripts through an external interpreter process, e.g. `python3 script.py`.
pub struct InterpreterSandbox {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    current: Mutex<Option<SharedChild>>,
}

impl InterpreterSandbox {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            current: Mutex::new(None),
        }
    }

    /// Extra arguments placed before the script path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Kills executions that run longer than `timeout`. Without it a hung
    /// program blocks its caller indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait(&self, child: &SharedChild) -> Result<ExitStatus, SandboxError> {
        let started = Instant::now();
        loop {
            if let Some(status) = lock(child).try_wait()? {
                return Ok(status);
            }
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    let mut child = lock(child);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SandboxError::TimedOut(limit));
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn untrack(&self, child: &SharedChild) {
        let mut current = lock(&self.current);
        if current.as_ref().is_some_and(|c| Arc::ptr_eq(c, child)) {
            *current = None;
        }
    }
}

impl Sandbox for InterpreterSandbox {
    fn execute(&self, script: &Script<'_>, stdin: &str) -> Result<Execution, SandboxError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(script.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SandboxError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(pid = child.id(), script = %script.path.display(), "Started interpreter");

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());
        let stdin_pipe = child.stdin.take();

        // Tracked before any input is written so a blocked write can be cancelled.
        let child = Arc::new(Mutex::new(child));
        *lock(&self.current) = Some(Arc::clone(&child));
        let stdin_writer = spawn_writer(stdin_pipe, stdin.as_bytes().to_vec());
        let status = self.wait(&child);
        self.untrack(&child);

        let written = join_worker(stdin_writer, "input writer");
        let stdout = join_worker(stdout_reader, "output reader");
        let stderr = join_worker(stderr_reader, "output reader");
        let status = status?;
        written?;

        Ok(Execution {
            stdout: stdout?,
            stderr: stderr?,
            exit_code: status.code(),
        })
    }

    fn cancel_current(&self) -> bool {
        let Some(child) = lock(&self.current).take() else {
            return false;
        };
        let mut child = lock(&child);
        match child.try_wait() {
            Ok(None) => {
                let killed = child.kill().is_ok();
                if killed {
                    info!(pid = child.id(), "Cancelled running test process");
                }
                killed
            }
            _ => false,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let mut bytes = Vec::new();
            pipe.read_to_end(&mut bytes)?;
            text = String::from_utf8_lossy(&bytes).into_owned();
        }
        Ok(text)
    })
}

fn spawn_writer<W: Write + Send + 'static>(
    pipe: Option<W>,
    input: Vec<u8>,
) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let Some(mut pipe) = pipe else {
            return Ok(());
        };
        // The program may exit, or be killed, without reading its input.
        match pipe.write_all(&input) {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(()),
        }
    })
}

fn join_worker<T>(handle: JoinHandle<io::Result<T>>, name: &str) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other(format!("{} panicked", name))))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn script(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("script.sh");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn captures_stdout_and_feeds_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "read value\necho \"got $value\"\n");
        let sandbox = InterpreterSandbox::new("sh");
        let execution = sandbox
            .execute(
                &Script {
                    path: &path,
                    source: "",
                },
                "42\n",
            )
            .unwrap();
        assert!(execution.success());
        assert_eq!(execution.stdout, "got 42\n");
    }

    #[test]
    fn reports_non_zero_exit_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "echo boom >&2\nexit 3\n");
        let execution = InterpreterSandbox::new("sh")
            .execute(
                &Script {
                    path: &path,
                    source: "",
                },
                "",
            )
            .unwrap();
        assert_eq!(execution.exit_code, Some(3));
        assert_eq!(execution.stderr.trim(), "boom");
    }

    #[test]
    fn timeout_kills_hung_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 10\n");
        let sandbox =
            InterpreterSandbox::new("sh").with_timeout(Some(Duration::from_millis(100)));
        let result = sandbox.execute(
            &Script {
                path: &path,
                source: "",
            },
            "",
        );
        assert!(matches!(result, Err(SandboxError::TimedOut(_))));
    }

    #[test]
    fn cancel_kills_the_running_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 10\n");
        let sandbox = Arc::new(InterpreterSandbox::new("sh"));
        assert!(!sandbox.cancel_current());

        let runner = {
            let sandbox = Arc::clone(&sandbox);
            let path = path.clone();
            thread::spawn(move || {
                sandbox.execute(
                    &Script {
                        path: &path,
                        source: "",
                    },
                    "",
                )
            })
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while !sandbox.cancel_current() {
            assert!(Instant::now() < deadline, "process never became current");
            thread::sleep(Duration::from_millis(10));
        }
        let execution = runner.join().unwrap().unwrap();
        assert!(!execution.success());
    }

    #[test]
    fn input_the_program_never_reads_does_not_block_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 10\n");
        let sandbox = Arc::new(InterpreterSandbox::new("sh"));
        // Far larger than a pipe buffer, so the write blocks until the process dies.
        let input = "1\n".repeat(1 << 20);

        let runner = {
            let sandbox = Arc::clone(&sandbox);
            let path = path.clone();
            thread::spawn(move || {
                sandbox.execute(
                    &Script {
                        path: &path,
                        source: "",
                    },
                    &input,
                )
            })
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while !sandbox.cancel_current() {
            assert!(Instant::now() < deadline, "process never became current");
            thread::sleep(Duration::from_millis(10));
        }
        let execution = runner.join().unwrap().unwrap();
        assert!(!execution.success());
    }

    #[test]
    fn timeout_applies_while_input_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 10\n");
        let sandbox =
            InterpreterSandbox::new("sh").with_timeout(Some(Duration::from_millis(100)));
        let result = sandbox.execute(
            &Script {
                path: &path,
                source: "",
            },
            &"1\n".repeat(1 << 20),
        );
        assert!(matches!(result, Err(SandboxError::TimedOut(_))));
    }

    #[test]
    fn missing_interpreter_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "");
        let result = InterpreterSandbox::new("definitely-not-an-interpreter-douki").execute(
            &Script {
                path: &path,
                source: "",
            },
            "",
        );
        assert!(matches!(result, Err(SandboxError::Spawn { .. })));
    }
}
