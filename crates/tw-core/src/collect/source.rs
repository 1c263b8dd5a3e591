//! Line sources: where raw reader lines come from.
//!
//! A [`LineSource`] hands back at most one raw line per call. `Ok(None)`
//! means nothing arrived within the source's read timeout, which is a normal
//! idle cycle. `Err` means no further lines will ever arrive.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Fatal line-source failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("line source {source_name} closed")]
    Closed { source_name: String },

    #[error("cannot open reader device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("read from {source_name} failed: {source}")]
    Io {
        source_name: String,
        #[source]
        source: io::Error,
    },
}

impl From<TransportError> for tw_common::Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed { source_name } => {
                tw_common::Error::TransportClosed { source_name }
            }
            TransportError::Open { device, .. } => tw_common::Error::DeviceUnavailable { device },
            other @ TransportError::Io { .. } => {
                tw_common::Error::TransportFailure(other.to_string())
            }
        }
    }
}

/// A stream of newline-terminated reader lines.
pub trait LineSource {
    /// Next raw line (terminator included if present), `Ok(None)` on timeout.
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Human-readable name for logs and errors.
    fn name(&self) -> &str;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).next_line()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Line source over any buffered reader, read on the calling thread.
///
/// Reader timeouts (`TimedOut`/`WouldBlock`) are reported as idle cycles and
/// any partial line read before the timeout is kept for the next call.
pub struct ReaderLineSource<R> {
    name: String,
    reader: R,
    pending: Vec<u8>,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            pending: Vec::new(),
        }
    }
}

impl ReaderLineSource<BufReader<File>> {
    /// Open a file (or an already configured character device) for reading.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let file = File::open(path).map_err(|source| TransportError::Open {
            device: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Err(TransportError::Closed {
                source_name: self.name.clone(),
            }),
            // A full line, or the unterminated tail at end of stream.
            Ok(_) => Ok(Some(std::mem::take(&mut self.pending))),
            Err(e) if is_idle(&e) => Ok(None),
            Err(source) => Err(TransportError::Io {
                source_name: self.name.clone(),
                source,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Lines a [`ThreadedLineSource`] buffers before the reader thread blocks.
pub const DEFAULT_LINE_BACKLOG: usize = 16;

/// Line source with a bounded read timeout over a blocking reader.
///
/// A dedicated reader thread blocks on the device and forwards complete
/// lines over a bounded channel; [`LineSource::next_line`] waits at most
/// `timeout` for the next one. Once `backlog` lines are waiting the reader
/// thread stops reading, so the device (or pipe) sees backpressure instead of
/// lines piling up in memory. The thread exits when the reader reaches end of stream
/// or fails, after which the source reports [`TransportError::Closed`].
pub struct ThreadedLineSource {
    name: String,
    timeout: Duration,
    lines: Receiver<io::Result<Vec<u8>>>,
    _reader: JoinHandle<()>,
}

impl ThreadedLineSource {
    /// Spawn the reader thread over `reader` with [`DEFAULT_LINE_BACKLOG`].
    pub fn spawn<R>(
        name: impl Into<String>,
        reader: R,
        timeout: Duration,
    ) -> Result<Self, TransportError>
    where
        R: Read + Send + 'static,
    {
        Self::spawn_with_backlog(name, reader, timeout, DEFAULT_LINE_BACKLOG)
    }

    /// Spawn the reader thread, buffering at most `backlog` lines (min 1).
    pub fn spawn_with_backlog<R>(
        name: impl Into<String>,
        reader: R,
        timeout: Duration,
        backlog: usize,
    ) -> Result<Self, TransportError>
    where
        R: Read + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = mpsc::sync_channel(backlog.max(1));
        let handle = thread::Builder::new()
            .name("tw-line-reader".to_string())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                loop {
                    let mut line = Vec::new();
                    match reader.read_until(b'\n', &mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(Ok(line)).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            let _ = tx.send(Err(e));
                            break;
                        }
                    }
                }
            })
            .map_err(|source| TransportError::Io {
                source_name: name.clone(),
                source,
            })?;

        Ok(Self {
            name,
            timeout,
            lines: rx,
            _reader: handle,
        })
    }

    /// Open a reader device (e.g. `/dev/ttyACM0`) and start reading it.
    ///
    /// Line settings such as the baud rate must already be applied to the
    /// device; this only reads bytes from it.
    pub fn open_device(path: &Path, timeout: Duration) -> Result<Self, TransportError> {
        let file = File::open(path).map_err(|source| TransportError::Open {
            device: path.display().to_string(),
            source,
        })?;
        Self::spawn(path.display().to_string(), file, timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl LineSource for ThreadedLineSource {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.lines.recv_timeout(self.timeout) {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(source)) => Err(TransportError::Io {
                source_name: self.name.clone(),
                source,
            }),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed {
                source_name: self.name.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pre-scripted source for tests, benchmarks and replays.
///
/// Each entry is either a line or an idle (timed-out) cycle. Once the
/// script is exhausted the source reports [`TransportError::Closed`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedLineSource {
    script: VecDeque<Option<Vec<u8>>>,
}

impl ScriptedLineSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script made of the given lines, in order.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut source = Self::new();
        for line in lines {
            source.push_line(line.as_ref());
        }
        source
    }

    pub fn push_line(&mut self, line: &str) -> &mut Self {
        self.script.push_back(Some(line.as_bytes().to_vec()));
        self
    }

    pub fn push_timeout(&mut self) -> &mut Self {
        self.script.push_back(None);
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl LineSource for ScriptedLineSource {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.script.pop_front() {
            Some(entry) => Ok(entry),
            None => Err(TransportError::Closed {
                source_name: "script".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "script"
    }
}
