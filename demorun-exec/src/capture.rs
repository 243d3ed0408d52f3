//! Output Capture
//!
//! Each pipe is drained by its own thread into a shared buffer. The executor
//! can read a snapshot at any time, which is how partial output survives a
//! timeout. A pipe held open by a stray grandchild never blocks the executor:
//! `finish` waits a bounded drain window and then takes whatever arrived.

use std::io::Read;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const CHUNK_SIZE: usize = 8 * 1024;

/// Background reader for one child pipe
pub struct OutputCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl OutputCapture {
    /// Start draining `source`. A missing pipe yields an empty capture.
    pub fn start<R>(name: &str, source: Option<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();

        let Some(mut source) = source else {
            let _ = tx.send(());
            return Self {
                buffer,
                done,
                handle: None,
            };
        };

        let sink = Arc::clone(&buffer);
        let spawned = std::thread::Builder::new()
            .name(format!("demorun-{}", name))
            .spawn(move || {
                let mut chunk = [0u8; CHUNK_SIZE];
                loop {
                    match source.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            let mut buf = sink.lock().unwrap_or_else(|e| e.into_inner());
                            buf.extend_from_slice(&chunk[..n]);
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            tracing::debug!("Output pipe read failed: {}", e);
                            break;
                        }
                    }
                }
                let _ = tx.send(());
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Failed to start {} reader thread: {}", name, e);
                None
            }
        };

        Self {
            buffer,
            done,
            handle,
        }
    }

    /// Copy of everything read so far
    pub fn snapshot(&self) -> String {
        let buf = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Wait up to `drain` for the pipe to close, then return the captured text
    pub fn finish(mut self, drain: Duration) -> String {
        match self.done.recv_timeout(drain) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("Output pipe still open after drain window, detaching reader");
            }
        }
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Instant;

    #[test]
    fn test_captures_full_stream() {
        let data = "line one\nline two\n".repeat(2_000);
        let capture = OutputCapture::start("stdout", Some(Cursor::new(data.clone().into_bytes())));
        assert_eq!(capture.finish(Duration::from_secs(5)), data);
    }

    #[test]
    fn test_missing_pipe_is_empty() {
        let capture = OutputCapture::start::<Cursor<Vec<u8>>>("stderr", None);
        assert_eq!(capture.finish(Duration::from_millis(10)), "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let capture = OutputCapture::start("stdout", Some(Cursor::new(vec![b'o', b'k', 0xff])));
        assert_eq!(capture.finish(Duration::from_secs(5)), "ok\u{fffd}");
    }

    struct Blocking;

    impl Read for Blocking {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            std::thread::sleep(Duration::from_secs(30));
            Ok(0)
        }
    }

    #[test]
    fn test_finish_does_not_wait_on_open_pipe() {
        let capture = OutputCapture::start("stdout", Some(Blocking));
        let start = Instant::now();
        assert_eq!(capture.finish(Duration::from_millis(50)), "");
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
