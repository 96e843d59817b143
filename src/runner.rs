//! Process runner: executes the binary under test against one case input.
//!
//! Each execution owns:
//! - the child process, started as the leader of its own process group and
//!   kept behind a mutex shared with the watchdog
//! - one reader thread per output pipe, each filling a fresh buffer
//! - one watchdog thread that kills the whole group if it outlives the timeout
//!
//! The watchdog is always joined before [`execute`] returns. Readers hand their
//! buffers back over a channel; if a descendant that left the process group
//! still holds a pipe shortly after the deadline, its reader is abandoned so
//! the next case can start.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{HarnessError, HarnessResult};

/// Replaces stdout of a case that had to be killed.
pub const TIMEOUT_MESSAGE: &str = "the test runner detected an infinite loop";

/// Poll interval used only when a child closes its pipes but keeps running.
const REAP_INTERVAL: Duration = Duration::from_millis(5);

/// How long past the timeout the pipes may stay open before their readers are
/// given up on.
const LINGER: Duration = Duration::from_millis(250);

/// How the process under test ended. Exactly one per execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exited on its own. `None` when terminated by a signal we did not send.
    Exited(Option<i32>),
    /// Killed by the watchdog.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl ExecutionResult {
    pub fn timed_out(&self) -> bool {
        self.outcome == Outcome::TimedOut
    }
}

/// Runs `binary input` and waits for it, killing it after `timeout`.
pub fn execute(binary: &Path, input: &Path, timeout: Duration) -> HarnessResult<ExecutionResult> {
    debug!(binary = %binary.display(), input = %input.display(), "spawning");
    let started = Instant::now();
    let mut command = Command::new(binary);
    command
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let mut child = command.spawn().map_err(|source| HarnessError::Spawn {
        binary: binary.to_path_buf(),
        source,
    })?;

    let (sender, output) = mpsc::channel();
    drain(Stream::Stdout, child.stdout.take(), sender.clone());
    drain(Stream::Stderr, child.stderr.take(), sender);
    let tracked = Arc::new(Mutex::new(Tracked {
        child,
        status: None,
    }));
    let (cancel, watchdog) = Watchdog::start(Arc::clone(&tracked), timeout);

    let captured = collect(&output, started + timeout + LINGER);
    let status = reap(&tracked);
    let elapsed = started.elapsed();

    drop(cancel);
    let killed = watchdog.join().unwrap_or(false);

    let status = status.map_err(|source| HarnessError::Capture { source })?;
    let (stdout, stderr) = captured.into_streams();
    let mut stdout = stdout.map_err(|source| HarnessError::Capture { source })?;
    let stderr = stderr.map_err(|source| HarnessError::Capture { source })?;

    let outcome = if killed {
        warn!(input = %input.display(), ?timeout, "killed process under test");
        stdout = TIMEOUT_MESSAGE.as_bytes().to_vec();
        Outcome::TimedOut
    } else {
        Outcome::Exited(status.code())
    };

    Ok(ExecutionResult {
        stdout,
        stderr,
        elapsed,
        outcome,
    })
}

/// The child plus its exit status once the driver has reaped it. While
/// `status` is empty the child's pid, and so its process group id, cannot have
/// been reused.
struct Tracked {
    child: Child,
    status: Option<ExitStatus>,
}

/// Kills the child's process group once the timeout elapses, unless cancelled
/// first.
///
/// Cancellation is dropping the returned sender. The thread yields `true` only
/// if it actually sent the kill.
struct Watchdog;

impl Watchdog {
    fn start(tracked: Arc<Mutex<Tracked>>, timeout: Duration) -> (Sender<()>, JoinHandle<bool>) {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let handle = thread::spawn(move || match cancelled.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                let mut tracked = lock(&tracked);
                if tracked.status.is_some() {
                    return false;
                }
                match terminate(&mut tracked.child) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(error = %err, "failed to kill process under test");
                        false
                    }
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        });
        (cancel, handle)
    }
}

/// Sends SIGKILL to every process in the child's group, so helpers started by a
/// wrapper script die with it.
#[cfg(unix)]
fn terminate(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(child.id()) else {
        return child.kill();
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) => Ok(()),
        Err(errno) => {
            debug!(%errno, "killpg failed, killing the child alone");
            child.kill()
        }
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> io::Result<()> {
    child.kill()
}

fn lock(tracked: &Mutex<Tracked>) -> MutexGuard<'_, Tracked> {
    tracked.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

type Chunk = (Stream, io::Result<Vec<u8>>);

fn drain<R: Read + Send + 'static>(stream: Stream, pipe: Option<R>, sender: Sender<Chunk>) {
    let Some(mut pipe) = pipe else {
        let _ = sender.send((stream, Ok(Vec::new())));
        return;
    };
    thread::spawn(move || {
        let mut buf = Vec::new();
        let read = pipe.read_to_end(&mut buf).map(|_| buf);
        let _ = sender.send((stream, read));
    });
}

/// Buffers handed back by the readers.
#[derive(Default)]
struct Captured {
    stdout: Option<io::Result<Vec<u8>>>,
    stderr: Option<io::Result<Vec<u8>>>,
    abandoned: bool,
}

impl Captured {
    /// `(stdout, stderr)`. A stream given up on after the deadline is empty.
    fn into_streams(self) -> (io::Result<Vec<u8>>, io::Result<Vec<u8>>) {
        let abandoned = self.abandoned;
        let finish = |read: Option<io::Result<Vec<u8>>>| match read {
            Some(read) => read,
            None if abandoned => Ok(Vec::new()),
            None => Err(io::Error::new(io::ErrorKind::Other, "output reader panicked")),
        };
        (finish(self.stdout), finish(self.stderr))
    }
}

/// Waits for both readers to reach EOF, but never past `deadline`.
fn collect(output: &Receiver<Chunk>, deadline: Instant) -> Captured {
    let mut captured = Captured::default();
    while captured.stdout.is_none() || captured.stderr.is_none() {
        let wait = deadline.saturating_duration_since(Instant::now());
        match output.recv_timeout(wait) {
            Ok((Stream::Stdout, read)) => captured.stdout = Some(read),
            Ok((Stream::Stderr, read)) => captured.stderr = Some(read),
            Err(RecvTimeoutError::Timeout) => {
                warn!("output pipes still open after the process was killed, giving up on them");
                captured.abandoned = true;
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    captured
}

/// Waits for the child without holding the lock across a blocking call, so the
/// watchdog can still get in. Pipes are normally at EOF here, which almost
/// always means the child is gone and the first `try_wait` succeeds.
fn reap(tracked: &Mutex<Tracked>) -> io::Result<ExitStatus> {
    loop {
        let mut guard = lock(tracked);
        if let Some(status) = guard.child.try_wait()? {
            guard.status = Some(status);
            return Ok(status);
        }
        drop(guard);
        thread::sleep(REAP_INTERVAL);
    }
}
