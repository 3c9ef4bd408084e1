//! Boundary-marker tokenizer for concatenated JSON records.
//!
//! A record ends at the first `\n}` (a closing brace at the start of a line).
//! This holds for the diagnostic tool's pretty-printed output, whose nested
//! objects are always indented. Input that embeds `\n}` inside a record needs
//! a depth-counting scanner instead; this one would split it early.
//!
//! Rules:
//! - a token is everything up to and including the `}` of the marker;
//! - an unterminated tail at end of input is dropped;
//! - truncated input ends the sequence, it never panics.

use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{ProxyCtlError, Result};

/// Marker that closes a top-level record.
pub const RECORD_TERMINATOR: &[u8] = b"\n}";

/// Default cap on the size of one record.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

const READ_CHUNK: usize = 4096;

/// Lazy iterator over record tokens read from `R`.
///
/// Each scanner owns its buffer; build a new one per stream.
#[derive(Debug)]
pub struct RecordScanner<R> {
    reader: R,
    buf: BytesMut,
    // Bytes of `buf` already searched without finding a marker.
    searched: usize,
    max_record_bytes: usize,
    done: bool,
}

impl<R: Read> RecordScanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, DEFAULT_MAX_RECORD_BYTES)
    }

    /// Scanner that fails once a record grows past `max_record_bytes`.
    pub fn with_limit(reader: R, max_record_bytes: usize) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CHUNK),
            searched: 0,
            max_record_bytes,
            done: false,
        }
    }

    fn too_long(&mut self) -> ProxyCtlError {
        self.done = true;
        self.buf.clear();
        ProxyCtlError::ExternalTool(format!(
            "diagnostic record exceeds {} bytes",
            self.max_record_bytes
        ))
    }

    fn fill(&mut self) -> io::Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);
        loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => {
                    self.buf.truncate(start + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}

impl<R: Read> Iterator for RecordScanner<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(i) = find_terminator(&self.buf, self.searched) {
                let end = i + RECORD_TERMINATOR.len();
                if end > self.max_record_bytes {
                    return Some(Err(self.too_long()));
                }
                self.searched = 0;
                return Some(Ok(self.buf.split_to(end).freeze()));
            }
            // Re-check the last byte: it may be the '\n' of a marker split across reads.
            self.searched = self.buf.len().saturating_sub(RECORD_TERMINATOR.len() - 1);

            if self.done {
                if !self.buf.is_empty() {
                    tracing::trace!(
                        len = self.buf.len(),
                        "dropping unterminated trailing fragment"
                    );
                    self.buf.clear();
                }
                return None;
            }

            if self.buf.len() > self.max_record_bytes {
                return Some(Err(self.too_long()));
            }

            match self.fill() {
                Ok(0) => self.done = true,
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(ProxyCtlError::ExternalTool(format!(
                        "read diagnostic output failed: {e}"
                    ))));
                }
            }
        }
    }
}

fn find_terminator(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(RECORD_TERMINATOR.len())
        .position(|w| w == RECORD_TERMINATOR)
        .map(|i| i + from)
}
