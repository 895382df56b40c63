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

//! In-memory backings: growable containers, read-only bytes and fixed regions.

use lumen_core::error::set_error;
use lumen_core::stream::{clamp_elements, resolve_seek, StreamBacking, StreamError, Whence};
use std::borrow::{Borrow, BorrowMut};

/// Copies whole elements out of `data` starting at `*position`.
///
/// Returns `0` without moving when fewer than `size` bytes remain. Otherwise
/// copies up to `maxnum * size` bytes, advances by the bytes copied and
/// returns the number of whole elements among them.
fn read_at(
    data: &[u8],
    position: &mut usize,
    buf: &mut [u8],
    size: usize,
    maxnum: usize,
) -> usize {
    let maxnum = clamp_elements(buf.len(), size, maxnum);
    if maxnum == 0 {
        return 0;
    }
    match position.checked_add(size) {
        Some(end) if end <= data.len() => {}
        _ => return 0,
    }
    let start = *position;
    let toread = (data.len() - start).min(maxnum * size);
    buf[..toread].copy_from_slice(&data[start..start + toread]);
    *position += toread;
    toread / size
}

fn seek_unclamped(
    position: usize,
    len: usize,
    offset: i64,
    whence: Whence,
) -> Result<usize, StreamError> {
    let target = resolve_seek(position as u64, len as u64, offset, whence)?;
    usize::try_from(target).map_err(|_| StreamError::PositionOutOfRange(target))
}

/// A growable byte container.
///
/// Seeking past the end is allowed; a later write grows the container to
/// exactly the end of the written range, zero-filling any gap.
#[derive(Debug)]
pub struct ContainerStream<C> {
    container: C,
    position: usize,
}

impl<C: BorrowMut<Vec<u8>>> ContainerStream<C> {
    /// Wraps `container` with the position at `0`.
    pub fn new(container: C) -> Self {
        Self {
            container,
            position: 0,
        }
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the backing bytes.
    pub fn get_ref(&self) -> &[u8] {
        <C as Borrow<Vec<u8>>>::borrow(&self.container)
    }

    /// Unwraps the container.
    pub fn into_inner(self) -> C {
        self.container
    }
}

impl<C: BorrowMut<Vec<u8>>> StreamBacking for ContainerStream<C> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        let len = <C as Borrow<Vec<u8>>>::borrow(&self.container).len();
        self.position = seek_unclamped(self.position, len, offset, whence)?;
        Ok(self.position as u64)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        let data = <C as Borrow<Vec<u8>>>::borrow(&self.container);
        read_at(data, &mut self.position, buf, size, maxnum)
    }

    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        let num = clamp_elements(buf.len(), size, num);
        let bytes = size * num;
        let Some(end) = self.position.checked_add(bytes) else {
            set_error(StreamError::PositionOutOfRange(self.position as u64).to_string());
            return 0;
        };
        let data = <C as BorrowMut<Vec<u8>>>::borrow_mut(&mut self.container);
        if end > data.len() {
            data.resize(end, 0);
        }
        data[self.position..end].copy_from_slice(&buf[..bytes]);
        self.position = end;
        num
    }

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Read-only bytes. Every write fails with `0` and an ambient error.
#[derive(Debug)]
pub struct ConstStream<B> {
    data: B,
    position: usize,
}

impl<B: AsRef<[u8]>> ConstStream<B> {
    /// Wraps `data` with the position at `0`.
    pub fn new(data: B) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<B: AsRef<[u8]>> StreamBacking for ConstStream<B> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        let len = self.data.as_ref().len();
        self.position = seek_unclamped(self.position, len, offset, whence)?;
        Ok(self.position as u64)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        read_at(self.data.as_ref(), &mut self.position, buf, size, maxnum)
    }

    fn write(&mut self, _: &[u8], _: usize, _: usize) -> usize {
        log::warn!("Rejected write to a read-only stream.");
        set_error(StreamError::ReadOnly.to_string());
        0
    }

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// A fixed, caller-owned memory region.
///
/// Seeks are clamped into `[0, len]`. Writes inside the region succeed; a
/// write that would extend past the end fails without touching the region.
#[derive(Debug)]
pub struct FixedStream<'a> {
    region: &'a mut [u8],
    position: usize,
}

impl<'a> FixedStream<'a> {
    /// Wraps `region` with the position at `0`.
    pub fn new(region: &'a mut [u8]) -> Self {
        Self {
            region,
            position: 0,
        }
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl StreamBacking for FixedStream<'_> {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        let len = self.region.len();
        let target = match resolve_seek(self.position as u64, len as u64, offset, whence) {
            Ok(target) => target.min(len as u64),
            Err(StreamError::NegativePosition(_)) => 0,
            Err(err) => return Err(err),
        };
        self.position = target as usize;
        Ok(target)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        read_at(&*self.region, &mut self.position, buf, size, maxnum)
    }

    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        let num = clamp_elements(buf.len(), size, num);
        let bytes = size * num;
        let capacity = self.region.len();
        match self.position.checked_add(bytes) {
            Some(end) if end <= capacity => {
                self.region[self.position..end].copy_from_slice(&buf[..bytes]);
                self.position = end;
                num
            }
            _ => {
                let err = StreamError::CapacityExceeded {
                    position: self.position as u64,
                    requested: bytes,
                    capacity,
                };
                log::warn!("{err}");
                set_error(err.to_string());
                0
            }
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::error::{clear_error, get_error};

    #[test]
    fn write_then_read_back_from_empty_container() {
        let mut stream = ContainerStream::new(Vec::new());
        assert_eq!(stream.write(b"1234", 1, 4), 4);
        assert_eq!(stream.seek(0, Whence::Set).ok(), Some(0));

        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf, 1, 4), 4);
        assert_eq!(&buf, b"1234");
    }

    #[test]
    fn write_past_end_grows_with_zero_fill() {
        let mut backing = vec![1u8, 2];
        {
            let mut stream = ContainerStream::new(&mut backing);
            assert_eq!(stream.seek(4, Whence::Set).ok(), Some(4));
            assert_eq!(stream.write(&[9, 9], 2, 1), 1);
            assert_eq!(stream.position(), 6);
        }
        assert_eq!(backing, vec![1, 2, 0, 0, 9, 9]);
    }

    #[test]
    fn read_at_eof_boundary_returns_zero_and_keeps_position() {
        let mut stream = ContainerStream::new(vec![1u8, 2, 3, 4]);
        stream.seek(1, Whence::Set).expect("seek");
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf, 4, 1), 0);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn short_read_counts_whole_elements_and_advances_by_bytes_copied() {
        let mut stream = ContainerStream::new(vec![0u8; 10]);
        stream.seek(4, Whence::Set).expect("seek");
        let mut buf = [0u8; 8];
        // Six bytes remain: one whole 4-byte element plus a two-byte tail.
        assert_eq!(stream.read(&mut buf, 4, 2), 1);
        assert_eq!(stream.position(), 10);
    }

    #[test]
    fn seek_whence_arithmetic() {
        let mut stream = ContainerStream::new(vec![0u8; 10]);
        assert_eq!(stream.seek(3, Whence::Set).ok(), Some(3));
        assert_eq!(stream.seek(2, Whence::Cur).ok(), Some(5));
        assert_eq!(stream.seek(-1, Whence::End).ok(), Some(9));
    }

    #[test]
    fn seek_before_start_fails() {
        let mut stream = ContainerStream::new(vec![0u8; 2]);
        assert!(matches!(
            stream.seek(-3, Whence::End),
            Err(StreamError::NegativePosition(-1))
        ));
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn const_stream_rejects_every_write() {
        let data = *b"abcdef";
        let mut stream = ConstStream::new(&data[..]);
        clear_error();
        assert_eq!(stream.write(b"zz", 1, 2), 0);
        assert_eq!(stream.write(b"", 0, 0), 0);
        assert_eq!(get_error(), "Can't write to read-only container");

        let mut buf = [0u8; 6];
        assert_eq!(stream.read(&mut buf, 3, 2), 2);
        assert_eq!(&buf, b"abcdef");
    }

    #[test]
    fn fixed_stream_writes_in_bounds_and_rejects_growth() {
        let mut region = [0u8; 4];
        {
            let mut stream = FixedStream::new(&mut region);
            assert_eq!(stream.write(b"ab", 1, 2), 2);
            assert_eq!(stream.write(b"cde", 1, 3), 0);
            assert_eq!(stream.position(), 2);
        }
        assert_eq!(&region, b"ab\0\0");
    }

    #[test]
    fn fixed_stream_clamps_seeks() {
        let mut region = [0u8; 8];
        let mut stream = FixedStream::new(&mut region);
        assert_eq!(stream.seek(20, Whence::Set).ok(), Some(8));
        assert_eq!(stream.seek(-20, Whence::Cur).ok(), Some(0));
    }

    #[test]
    fn read_clamps_to_buffer_length() {
        let mut stream = ConstStream::new(vec![7u8; 16]);
        let mut buf = [0u8; 3];
        assert_eq!(stream.read(&mut buf, 1, 10), 3);
        assert_eq!(stream.position(), 3);
    }
}
