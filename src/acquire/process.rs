//! Subprocess execution with a deadline.

use std::io::{ErrorKind, Read};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::AcquireError;

const POLL: Duration = Duration::from_millis(25);

/// Run `cmd` to completion, capturing stdout and stderr.
///
/// A binary that cannot be found maps to [`AcquireError::MissingDependency`];
/// a child still running at `timeout` is killed and reported as
/// [`AcquireError::TimedOut`].
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    tool: &str,
    timeout: Duration,
) -> Result<Output, AcquireError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => AcquireError::MissingDependency {
            tool: tool.to_string(),
        },
        _ => AcquireError::Io(e),
    })?;

    // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(tool, timeout_secs = timeout.as_secs(), "subprocess killed");
            return Err(AcquireError::TimedOut {
                tool: tool.to_string(),
                after: timeout,
            });
        }
        thread::sleep(POLL);
    };

    Ok(Output {
        status,
        stdout: stdout.map(collect).unwrap_or_default(),
        stderr: stderr.map(collect).unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}
