//! # Upload Progress & Scoped Sessions
//!
//! Streaming a payload to the remote API goes through a [`ProgressReporter`]:
//! `initialize` hands out the byte stream and its declared length, `terminate`
//! releases whatever the reporter holds (progress bar, file handle).
//!
//! [`UploadSession`] is the scoped acquisition around that pair. Opening a
//! session calls `initialize`; dropping it calls `terminate`. Because release
//! lives in `Drop`, it happens exactly once on every exit path: success, a
//! translated failure, an early `?`, or a panic unwinding through the upload.
//! A failed `initialize` never produces a session, so `terminate` is only
//! ever called after a successful `initialize`.
//!
//! ```rust
//! use action_framework::mock::FakeProgressReporter;
//! use action_framework::UploadSession;
//! use std::path::Path;
//!
//! let mut reporter = FakeProgressReporter::with_payload(b"zip-bytes".to_vec());
//! {
//!     let mut session = UploadSession::open(&mut reporter, Path::new("bp.zip")).unwrap();
//!     assert_eq!(session.length(), 9);
//!     let _payload = session.take_payload();
//! } // dropped here
//! assert_eq!(reporter.terminate_count(), 1);
//! ```

use crate::error::FrameworkError;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, info};

/// The byte stream handed to the remote client for one upload.
pub type Payload = Box<dyn AsyncRead + Send + Unpin>;

/// Collaborator that opens an upload payload and reports its progress.
pub trait ProgressReporter: Send {
    /// Opens the payload at `path`, returning the stream and its declared length.
    ///
    /// A length of zero is a real, empty payload, not an unknown length.
    fn initialize(&mut self, path: &Path) -> Result<(Payload, u64), FrameworkError>;

    /// Releases everything acquired by `initialize`.
    fn terminate(&mut self);
}

/// Scoped ownership of one upload's payload. Terminates the reporter on drop.
pub struct UploadSession<'a> {
    reporter: &'a mut dyn ProgressReporter,
    payload: Option<Payload>,
    length: u64,
}

impl<'a> UploadSession<'a> {
    /// Initializes `reporter` for `path`. On failure nothing is acquired and
    /// `terminate` is not called.
    pub fn open(
        reporter: &'a mut dyn ProgressReporter,
        path: &Path,
    ) -> Result<Self, FrameworkError> {
        let (payload, length) = reporter.initialize(path)?;
        debug!(path = %path.display(), length, "Upload session opened");
        Ok(Self {
            reporter,
            payload: Some(payload),
            length,
        })
    }

    /// Declared byte length of the payload.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Hands the payload over to the caller. A second call yields an empty stream.
    pub fn take_payload(&mut self) -> Payload {
        self.payload
            .take()
            .unwrap_or_else(|| Box::new(tokio::io::empty()))
    }
}

impl Drop for UploadSession<'_> {
    fn drop(&mut self) {
        self.payload = None;
        self.reporter.terminate();
        debug!(length = self.length, "Upload session released");
    }
}

/// Shared byte counter for a [`ProgressReader`].
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle(Arc<AtomicU64>);

impl ProgressHandle {
    pub fn bytes_read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// `AsyncRead` adapter that counts bytes and logs every 10% of the declared length.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    handle: ProgressHandle,
    last_step: u64,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64) -> Self {
        Self {
            inner,
            total,
            handle: ProgressHandle::default(),
            last_step: 0,
        }
    }

    pub fn handle(&self) -> ProgressHandle {
        self.handle.clone()
    }

    fn record(&mut self, n: u64) {
        let read = self.handle.0.fetch_add(n, Ordering::Relaxed) + n;
        if self.total == 0 {
            return;
        }
        let step = (read.saturating_mul(10) / self.total).min(10);
        if step > self.last_step {
            self.last_step = step;
            debug!(percent = step * 10, bytes = read, total = self.total, "Upload progress");
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let this = &mut *self;
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let n = (buf.filled().len() - before) as u64;
            if n > 0 {
                this.record(n);
            }
        }
        poll
    }
}

/// Reporter that streams a file from disk through a [`ProgressReader`].
#[derive(Default)]
pub struct FileProgressReporter {
    active: Option<(PathBuf, u64, ProgressHandle)>,
}

impl FileProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for FileProgressReporter {
    fn initialize(&mut self, path: &Path) -> Result<(Payload, u64), FrameworkError> {
        let file = std::fs::File::open(path).map_err(|source| FrameworkError::PayloadUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = file
            .metadata()
            .map_err(|source| FrameworkError::PayloadUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(FrameworkError::NotAFile(path.to_path_buf()));
        }

        let length = metadata.len();
        let reader = ProgressReader::new(tokio::fs::File::from_std(file), length);
        self.active = Some((path.to_path_buf(), length, reader.handle()));
        info!(path = %path.display(), length, "Uploading");
        Ok((Box::new(reader), length))
    }

    fn terminate(&mut self) {
        if let Some((path, length, handle)) = self.active.take() {
            info!(path = %path.display(), sent = handle.bytes_read(), length, "Upload finished");
        }
    }
}
