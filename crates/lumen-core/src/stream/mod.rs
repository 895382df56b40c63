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

//! The byte-stream contract consumed by the native file abstraction.
//!
//! A [`StreamBacking`] adapts some backing store (a growable buffer, a fixed
//! memory region, an I/O stream) to the seek/read/write/close model the
//! native library expects from a file handle. Reads and writes are counted
//! in *elements* of a caller-chosen size, and a read never returns a partial
//! element.
//!
//! Concrete backings live in `lumen-io`.

/// The reference point of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// Seek relative to the start of the stream.
    Set,
    /// Seek relative to the current position.
    Cur,
    /// Seek relative to the end of the stream.
    End,
}

impl Whence {
    /// Native value of [`Whence::Set`].
    pub const RAW_SET: i32 = 0;
    /// Native value of [`Whence::Cur`].
    pub const RAW_CUR: i32 = 1;
    /// Native value of [`Whence::End`].
    pub const RAW_END: i32 = 2;

    /// Converts a native whence value.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidWhence`] for any value other than `0`, `1` or `2`.
    pub fn from_raw(raw: i32) -> Result<Self, StreamError> {
        match raw {
            Self::RAW_SET => Ok(Self::Set),
            Self::RAW_CUR => Ok(Self::Cur),
            Self::RAW_END => Ok(Self::End),
            other => Err(StreamError::InvalidWhence(other)),
        }
    }

    /// Returns the native whence value.
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Set => Self::RAW_SET,
            Self::Cur => Self::RAW_CUR,
            Self::End => Self::RAW_END,
        }
    }
}

/// Errors produced by byte streams.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// A whence value outside `{SET, CUR, END}` was supplied. This is a logic error.
    #[error("unknown seek whence value {0}")]
    InvalidWhence(i32),
    /// The seek would move the position before the start of the stream.
    #[error("cannot seek to negative position {0}")]
    NegativePosition(i128),
    /// The seek target does not fit in the platform's address space.
    #[error("seek position {0} is out of range")]
    PositionOutOfRange(u64),
    /// The backing store does not accept writes.
    #[error("Can't write to read-only container")]
    ReadOnly,
    /// A fixed-size backing cannot hold the requested write.
    #[error("write of {requested} bytes at position {position} exceeds the {capacity}-byte region")]
    CapacityExceeded {
        /// Position of the attempted write.
        position: u64,
        /// Number of bytes requested.
        requested: usize,
        /// Size of the region.
        capacity: usize,
    },
    /// Fewer bytes than required were read.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead {
        /// Bytes requested.
        expected: usize,
        /// Bytes obtained.
        got: usize,
    },
    /// Fewer bytes than required were written.
    #[error("short write: expected {expected} bytes, wrote {written}")]
    ShortWrite {
        /// Bytes requested.
        expected: usize,
        /// Bytes accepted.
        written: usize,
    },
    /// The underlying stream is left in a failed state.
    #[error("stream is in a failed state")]
    BadState,
    /// The native stream handle could not be allocated.
    #[error("failed to allocate a native stream handle")]
    Allocation,
    /// The stream has already been closed.
    #[error("stream is closed")]
    Closed,
    /// A C-style open mode string could not be parsed.
    #[error("invalid file mode '{0}'")]
    InvalidMode(String),
    /// A failure reported by a native stream through the ambient error string.
    #[error("{0}")]
    Native(String),
    /// An I/O error from the backing stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The capability set a backing store must provide to act as a native file.
///
/// Counts are in elements of `size` bytes. Implementations never read past
/// `buf.len()`; callers use [`clamp_elements`] to keep `size * maxnum` within
/// the buffer.
pub trait StreamBacking {
    /// Moves the logical position and returns the new absolute position.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError>;

    /// Reads up to `maxnum` elements of `size` bytes into `buf`.
    ///
    /// Returns the number of whole elements read. Returns `0` without moving
    /// the position when not even one element remains.
    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize;

    /// Writes `num` elements of `size` bytes from `buf`.
    ///
    /// Returns the number of elements written, or `0` after recording the
    /// reason in the ambient error string.
    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize;

    /// Flushes and releases backing-specific resources.
    fn close(&mut self) -> Result<(), StreamError>;
}

impl<B: StreamBacking + ?Sized> StreamBacking for Box<B> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        (**self).seek(offset, whence)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        (**self).read(buf, size, maxnum)
    }

    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        (**self).write(buf, size, num)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}

/// Limits an element count so that `size * count` fits in a buffer of `buf_len` bytes.
///
/// Returns `0` when `size` is `0`.
pub fn clamp_elements(buf_len: usize, size: usize, count: usize) -> usize {
    if size == 0 {
        return 0;
    }
    count.min(buf_len / size)
}

/// Computes the absolute target of a seek over a store of `size` bytes.
///
/// The target may lie past the end of the store; only negative targets are
/// rejected.
///
/// # Errors
/// Returns [`StreamError::NegativePosition`] if the target precedes the start.
pub fn resolve_seek(
    position: u64,
    size: u64,
    offset: i64,
    whence: Whence,
) -> Result<u64, StreamError> {
    let base = match whence {
        Whence::Set => 0,
        Whence::Cur => i128::from(position),
        Whence::End => i128::from(size),
    };
    let target = base + i128::from(offset);
    u64::try_from(target).map_err(|_| StreamError::NegativePosition(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whence_raw_values_roundtrip() {
        for whence in [Whence::Set, Whence::Cur, Whence::End] {
            assert_eq!(Whence::from_raw(whence.as_raw()).ok(), Some(whence));
        }
    }

    #[test]
    fn unknown_whence_is_a_logic_error() {
        assert!(matches!(
            Whence::from_raw(7),
            Err(StreamError::InvalidWhence(7))
        ));
    }

    #[test]
    fn seek_arithmetic_on_ten_byte_store() {
        let pos = resolve_seek(0, 10, 3, Whence::Set).expect("set");
        assert_eq!(pos, 3);
        let pos = resolve_seek(pos, 10, 2, Whence::Cur).expect("cur");
        assert_eq!(pos, 5);
        let pos = resolve_seek(pos, 10, -1, Whence::End).expect("end");
        assert_eq!(pos, 9);
    }

    #[test]
    fn seek_past_end_is_allowed_but_before_start_is_not() {
        assert_eq!(resolve_seek(0, 4, 16, Whence::Set).ok(), Some(16));
        assert!(matches!(
            resolve_seek(2, 4, -3, Whence::Cur),
            Err(StreamError::NegativePosition(-1))
        ));
    }

    #[test]
    fn clamp_elements_respects_buffer() {
        assert_eq!(clamp_elements(10, 4, 5), 2);
        assert_eq!(clamp_elements(10, 0, 5), 0);
        assert_eq!(clamp_elements(16, 4, 3), 3);
    }
}
