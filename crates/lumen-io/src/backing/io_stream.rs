// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backings over `std::io` streams.
//!
//! A stream is adapted for reading ([`ReaderStream`]) or for writing
//! ([`WriterStream`]), never both: each adapter only requires the one
//! direction it uses, so a stream cannot be read- and write-adapted at once.

use lumen_core::error::set_error;
use lumen_core::stream::{clamp_elements, StreamBacking, StreamError, Whence};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// Maps a native seek onto the stream's own positioning.
pub(crate) fn seek_stream<S: Seek>(
    stream: &mut S,
    offset: i64,
    whence: Whence,
) -> Result<u64, StreamError> {
    let from = match whence {
        Whence::Set => match u64::try_from(offset) {
            Ok(start) => SeekFrom::Start(start),
            Err(_) => return Err(StreamError::NegativePosition(i128::from(offset))),
        },
        Whence::Cur => SeekFrom::Current(offset),
        Whence::End => SeekFrom::End(offset),
    };
    stream.seek(from).map_err(|err| {
        set_error(format!("Stream seek failed: {err}"));
        StreamError::Io(err)
    })
}

/// Reads up to `maxnum` whole elements, never leaving the cursor inside one.
///
/// Reaching the end of the data is not an error. If the read stops part-way
/// through an element, the cursor is moved back over exactly those trailing
/// bytes, so it rests at the start of the incomplete element. Sets `failed`
/// on a hard I/O error.
pub(crate) fn read_elements<S: Read + Seek>(
    stream: &mut S,
    failed: &mut bool,
    buf: &mut [u8],
    size: usize,
    maxnum: usize,
) -> usize {
    let wanted = size * clamp_elements(buf.len(), size, maxnum);
    if wanted == 0 {
        return 0;
    }

    let mut nread = 0;
    while nread < wanted {
        match stream.read(&mut buf[nread..wanted]) {
            Ok(0) => break,
            Ok(n) => nread += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                log::warn!("Stream read failed after {nread} bytes: {err}");
                set_error(format!("Stream read failed: {err}"));
                *failed = true;
                break;
            }
        }
    }

    let partial = nread % size;
    if nread != wanted && partial != 0 {
        // `partial < size <= wanted`, and `wanted` came from a slice length.
        let back = -(partial as i64);
        if let Err(err) = stream.seek(SeekFrom::Current(back)) {
            set_error(format!("Failed to push back a partial element: {err}"));
            *failed = true;
        }
    }

    nread / size
}

/// Writes `num` elements and flushes. Returns `num`, or `0` on a write error.
pub(crate) fn write_elements<S: Write>(
    stream: &mut S,
    failed: &mut bool,
    buf: &[u8],
    size: usize,
    num: usize,
) -> usize {
    let num = clamp_elements(buf.len(), size, num);
    let bytes = &buf[..size * num];
    match stream.write_all(bytes).and_then(|()| stream.flush()) {
        Ok(()) => num,
        Err(err) => {
            log::warn!("Stream write of {} bytes failed: {err}", bytes.len());
            set_error(format!("Stream write failed: {err}"));
            *failed = true;
            0
        }
    }
}

/// Adapts an input stream.
#[derive(Debug)]
pub struct ReaderStream<R> {
    inner: R,
    failed: bool,
}

impl<R: Read + Seek> ReaderStream<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    /// Returns `true` once a hard I/O error has occurred.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Returns a reference to the stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> StreamBacking for ReaderStream<R> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        seek_stream(&mut self.inner, offset, whence)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        read_elements(&mut self.inner, &mut self.failed, buf, size, maxnum)
    }

    fn write(&mut self, _: &[u8], _: usize, _: usize) -> usize {
        set_error("Stream is adapted for reading only");
        0
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if self.failed {
            return Err(StreamError::BadState);
        }
        Ok(())
    }
}

/// Adapts an output stream.
#[derive(Debug)]
pub struct WriterStream<W> {
    inner: W,
    failed: bool,
}

impl<W: Write + Seek> WriterStream<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    /// Returns `true` once a hard I/O error has occurred.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Returns a reference to the stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> StreamBacking for WriterStream<W> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        seek_stream(&mut self.inner, offset, whence)
    }

    fn read(&mut self, _: &mut [u8], _: usize, _: usize) -> usize {
        set_error("Stream is adapted for writing only");
        0
    }

    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        write_elements(&mut self.inner, &mut self.failed, buf, size, num)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.inner.flush()?;
        if self.failed {
            return Err(StreamError::BadState);
        }
        Ok(())
    }
}
