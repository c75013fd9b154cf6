// source.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use gstreamer as gst;
use gstreamer_app as gst_app;
use tracing::{debug, warn};

use crate::error::{PullPlayError, Result};

/// What the adapter hands to the engine for one need-data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedChunk {
    Data(Vec<u8>),
    Exhausted,
}

/// Demand-driven byte source feeding the appsrc element.
///
/// Owns the input handle together with the total size and the remaining
/// unread byte count. The state is only ever touched from the appsrc demand
/// callbacks, which the engine serializes; `attach_source_callbacks` wraps
/// the source in a mutex to keep that single-writer discipline explicit.
pub struct ByteSource<R> {
    input: R,
    total: u64,
    remaining: u64,
    suspended: bool,
}

impl ByteSource<BufReader<File>> {
    /// Open a file-backed source, rejecting unopenable or empty inputs.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| PullPlayError::Input(format!("cannot open {}: {e}", path.display())))?;
        let total = file
            .metadata()
            .map_err(|e| PullPlayError::Input(format!("cannot stat {}: {e}", path.display())))?
            .len();
        if total == 0 {
            return Err(PullPlayError::Input(format!(
                "{} is empty",
                path.display()
            )));
        }
        Ok(Self::new(BufReader::new(file), total))
    }
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(input: R, total: u64) -> Self {
        Self {
            input,
            total,
            remaining: total,
            suspended: false,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Engine signalled enough-data: stop producing until the next demand.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Engine signalled need-data: production may resume.
    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Read the next chunk of at most `requested` bytes.
    ///
    /// Delivers `min(remaining, requested)` bytes and decrements `remaining`
    /// by the amount actually read. Once `remaining` hits zero this returns
    /// `Exhausted` instead of touching the input again. A short read at the
    /// end of the underlying handle also drains the source.
    pub fn next_chunk(&mut self, requested: usize) -> Result<FeedChunk> {
        let wanted = self.remaining.min(requested as u64) as usize;
        if wanted == 0 {
            return Ok(FeedChunk::Exhausted);
        }

        let mut buf = vec![0u8; wanted];
        let mut filled = 0;
        while filled < wanted {
            let read = self.input.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }

        if filled == 0 {
            // Underlying handle ran dry before the declared size.
            self.remaining = 0;
            return Ok(FeedChunk::Exhausted);
        }

        buf.truncate(filled);
        self.remaining -= filled as u64;
        Ok(FeedChunk::Data(buf))
    }

    /// Reposition the read cursor; remaining becomes `total - position`.
    ///
    /// Idempotent and valid at any point, including before the first read.
    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        if position > self.total {
            return Err(PullPlayError::Seek(format!(
                "position {position} past end of input ({} bytes)",
                self.total
            )));
        }
        self.input
            .seek(SeekFrom::Start(position))
            .map_err(|e| PullPlayError::Seek(e.to_string()))?;
        self.remaining = self.total - position;
        Ok(())
    }
}

/// Register the three appsrc demand handlers on `appsrc`.
///
/// All three run on engine-managed streaming threads; they share the source
/// through the mutex and never block on anything but the input handle.
pub fn attach_source_callbacks<R>(appsrc: &gst_app::AppSrc, source: Arc<Mutex<ByteSource<R>>>)
where
    R: Read + Seek + Send + 'static,
{
    let need = Arc::clone(&source);
    let enough = Arc::clone(&source);
    let seek = source;

    let callbacks = gst_app::AppSrcCallbacks::builder()
        .need_data(move |appsrc, requested| {
            let chunk = {
                let mut src = need.lock().unwrap();
                src.resume();
                src.next_chunk(requested as usize)
            };
            match chunk {
                Ok(FeedChunk::Data(data)) => {
                    debug!(bytes = data.len(), "feeding chunk");
                    let buffer = gst::Buffer::from_mut_slice(data);
                    if let Err(err) = appsrc.push_buffer(buffer) {
                        warn!("engine rejected buffer: {err:?}");
                    }
                }
                Ok(FeedChunk::Exhausted) => {
                    debug!("input drained, signalling end of stream");
                    if let Err(err) = appsrc.end_of_stream() {
                        warn!("failed to signal end of stream: {err:?}");
                    }
                }
                Err(err) => {
                    warn!("read failed, signalling end of stream: {err}");
                    let _ = appsrc.end_of_stream();
                }
            }
        })
        .enough_data(move |_appsrc| {
            debug!("engine has enough data, suspending");
            enough.lock().unwrap().suspend();
        })
        .seek_data(move |_appsrc, offset| {
            let mut src = seek.lock().unwrap();
            match src.seek_to(offset) {
                Ok(()) => {
                    debug!(offset, remaining = src.remaining(), "seek");
                    true
                }
                Err(err) => {
                    warn!("seek to {offset} failed: {err}");
                    false
                }
            }
        })
        .build();

    appsrc.set_callbacks(callbacks);
}
