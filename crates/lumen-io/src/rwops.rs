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

//! The bridge between [`StreamBacking`] objects and the native stream table.
//!
//! The native library consumes files through a [`RawStream`]: a C struct of
//! four function pointers plus two opaque payload slots. [`RWops`] allocates
//! one, boxes the backing into `data1`, tags `data2` as Lumen-owned and
//! installs trampolines that recover the backing and forward each call.
//!
//! Ownership of the table is exclusive. The handle is released exactly once:
//! by [`RWops::close`], by `Drop`, or by whoever took it with
//! [`RWops::into_raw`] and later calls [`raw_close`].

use crate::backing::{
    ConstStream, ContainerStream, FileStream, FixedStream, ReaderStream, WriterStream,
};
use lumen_core::error::{clear_error, get_error, set_error};
use lumen_core::stream::{clamp_elements, StreamBacking, StreamError, Whence};
use std::alloc::{self, Layout};
use std::borrow::BorrowMut;
use std::ffi::{c_int, c_void};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr::{self, NonNull};

/// Native seek callback: returns the new position or `-1`.
pub type SeekFn = unsafe extern "C" fn(ctx: *mut RawStream, offset: i64, whence: c_int) -> i64;
/// Native read callback: returns the number of elements read.
pub type ReadFn =
    unsafe extern "C" fn(ctx: *mut RawStream, ptr: *mut c_void, size: usize, maxnum: usize) -> usize;
/// Native write callback: returns the number of elements written.
pub type WriteFn =
    unsafe extern "C" fn(ctx: *mut RawStream, ptr: *const c_void, size: usize, num: usize) -> usize;
/// Native close callback: releases the stream, returns `0` on success.
pub type CloseFn = unsafe extern "C" fn(ctx: *mut RawStream) -> c_int;

/// Stream type tag for streams whose callbacks are not a built-in kind.
pub const RAW_STREAM_UNKNOWN: u32 = 0;

/// The native stream table.
#[repr(C)]
#[derive(Debug)]
pub struct RawStream {
    /// Seek callback.
    pub seek: Option<SeekFn>,
    /// Read callback.
    pub read: Option<ReadFn>,
    /// Write callback.
    pub write: Option<WriteFn>,
    /// Close callback. Must free the table.
    pub close: Option<CloseFn>,
    /// Stream type tag.
    pub kind: u32,
    /// First opaque payload slot.
    pub data1: *mut c_void,
    /// Second opaque payload slot.
    pub data2: *mut c_void,
}

impl RawStream {
    const fn empty() -> Self {
        Self {
            seek: None,
            read: None,
            write: None,
            close: None,
            kind: RAW_STREAM_UNKNOWN,
            data1: ptr::null_mut(),
            data2: ptr::null_mut(),
        }
    }

    /// Allocates an empty table, or returns `None` if allocation fails.
    pub fn alloc() -> Option<NonNull<RawStream>> {
        let layout = Layout::new::<RawStream>();
        // SAFETY: `RawStream` has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) }.cast::<RawStream>())?;
        // SAFETY: `ptr` is freshly allocated with the layout of `RawStream`.
        unsafe { ptr.as_ptr().write(RawStream::empty()) };
        Some(ptr)
    }

    /// Frees a table obtained from [`RawStream::alloc`].
    ///
    /// # Safety
    /// `ptr` must come from [`RawStream::alloc`] and must not be used afterwards.
    pub unsafe fn free(ptr: NonNull<RawStream>) {
        alloc::dealloc(ptr.as_ptr().cast::<u8>(), Layout::new::<RawStream>());
    }
}

/// Calls a stream's seek callback, as the native library does.
///
/// # Safety
/// `ctx` must point to a live [`RawStream`], and any backing it wraps must
/// still be alive (a borrowed backing's borrow must not have ended).
pub unsafe fn raw_seek(ctx: *mut RawStream, offset: i64, whence: c_int) -> i64 {
    match (*ctx).seek {
        Some(seek) => seek(ctx, offset, whence),
        None => {
            set_error("Stream has no seek callback");
            -1
        }
    }
}

/// Calls a stream's read callback, as the native library does.
///
/// # Safety
/// `ctx` must point to a live [`RawStream`] whose backing is still alive,
/// and `ptr` to `size * maxnum` writable bytes.
pub unsafe fn raw_read(ctx: *mut RawStream, ptr: *mut c_void, size: usize, maxnum: usize) -> usize {
    match (*ctx).read {
        Some(read) => read(ctx, ptr, size, maxnum),
        None => {
            set_error("Stream has no read callback");
            0
        }
    }
}

/// Calls a stream's write callback, as the native library does.
///
/// # Safety
/// `ctx` must point to a live [`RawStream`] whose backing is still alive,
/// and `ptr` to `size * num` readable bytes.
pub unsafe fn raw_write(ctx: *mut RawStream, ptr: *const c_void, size: usize, num: usize) -> usize {
    match (*ctx).write {
        Some(write) => write(ctx, ptr, size, num),
        None => {
            set_error("Stream has no write callback");
            0
        }
    }
}

/// Calls a stream's close callback, which releases the table.
///
/// # Safety
/// `ctx` must point to a live [`RawStream`] whose backing is still alive;
/// it is dangling afterwards.
pub unsafe fn raw_close(ctx: *mut RawStream) -> c_int {
    match (*ctx).close {
        Some(close) => close(ctx),
        None => {
            RawStream::free(NonNull::new_unchecked(ctx));
            0
        }
    }
}

/// Heap cell stored in `data1`. The extra box gives a thin pointer.
struct Bridge<'a> {
    backing: Box<dyn StreamBacking + 'a>,
}

/// Address stored in `data2` to mark a table as Lumen-owned.
static LUMEN_STREAM_TAG: u8 = 0;

fn lumen_tag() -> *mut c_void {
    ptr::addr_of!(LUMEN_STREAM_TAG).cast_mut().cast()
}

/// Recovers the backing of a Lumen-owned table.
///
/// # Safety
/// `ctx` must be null or point to a live [`RawStream`].
unsafe fn backing_of<'x>(ctx: *mut RawStream) -> Option<&'x mut (dyn StreamBacking + 'static)> {
    if ctx.is_null() || (*ctx).data2 != lumen_tag() || (*ctx).data1.is_null() {
        set_error("Invalid stream handle");
        return None;
    }
    let bridge = (*ctx).data1.cast::<Bridge<'static>>();
    Some(&mut *(*bridge).backing)
}

/// Runs `f`, turning a panic into `fallback` so it never unwinds into C.
fn guarded<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("A stream callback panicked.");
        set_error("Stream callback panicked");
        fallback
    })
}

unsafe extern "C" fn seek_trampoline(ctx: *mut RawStream, offset: i64, whence: c_int) -> i64 {
    guarded(-1, || {
        let Some(backing) = backing_of(ctx) else {
            return -1;
        };
        let result = Whence::from_raw(whence).and_then(|whence| backing.seek(offset, whence));
        match result {
            Ok(position) => i64::try_from(position).unwrap_or_else(|_| {
                set_error(StreamError::PositionOutOfRange(position).to_string());
                -1
            }),
            Err(err) => {
                if let StreamError::InvalidWhence(_) = err {
                    log::error!("Logic error in stream seek: {err}");
                }
                set_error(err.to_string());
                -1
            }
        }
    })
}

unsafe extern "C" fn read_trampoline(
    ctx: *mut RawStream,
    ptr: *mut c_void,
    size: usize,
    maxnum: usize,
) -> usize {
    guarded(0, || {
        let Some(backing) = backing_of(ctx) else {
            return 0;
        };
        let Some(len) = size.checked_mul(maxnum).filter(|len| *len > 0) else {
            return 0;
        };
        if ptr.is_null() {
            set_error("Null read buffer");
            return 0;
        }
        let buf = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len);
        backing.read(buf, size, maxnum)
    })
}

unsafe extern "C" fn write_trampoline(
    ctx: *mut RawStream,
    ptr: *const c_void,
    size: usize,
    num: usize,
) -> usize {
    guarded(0, || {
        let Some(backing) = backing_of(ctx) else {
            return 0;
        };
        let Some(len) = size.checked_mul(num) else {
            set_error("Write size overflows");
            return 0;
        };
        let buf: &[u8] = if len == 0 || ptr.is_null() {
            &[]
        } else {
            std::slice::from_raw_parts(ptr.cast::<u8>(), len)
        };
        backing.write(buf, size, num)
    })
}

unsafe extern "C" fn close_trampoline(ctx: *mut RawStream) -> c_int {
    if ctx.is_null() {
        set_error("Invalid stream handle");
        return -1;
    }
    // Null the slot first so a re-entrant close cannot free the backing twice.
    let data1 = std::mem::replace(&mut (*ctx).data1, ptr::null_mut());
    let status = if data1.is_null() {
        0
    } else {
        let mut bridge = Box::from_raw(data1.cast::<Bridge<'static>>());
        guarded(-1, move || match bridge.backing.close() {
            Ok(()) => 0,
            Err(err) => {
                log::warn!("Closing stream backing failed: {err}");
                set_error(err.to_string());
                -1
            }
        })
    };
    RawStream::free(NonNull::new_unchecked(ctx));
    status
}

/// An owned native stream handle wrapping a [`StreamBacking`].
///
/// The lifetime `'a` bounds the backing, so a stream may wrap borrowed
/// storage such as `&mut Vec<u8>` or `&[u8]`.
pub struct RWops<'a> {
    raw: Option<NonNull<RawStream>>,
    _backing: PhantomData<&'a mut ()>,
}

impl<'a> RWops<'a> {
    /// Wraps `backing` in a freshly allocated native stream table.
    ///
    /// # Errors
    /// Returns [`StreamError::Allocation`] if the table cannot be allocated;
    /// nothing is leaked in that case.
    pub fn new<B: StreamBacking + 'a>(backing: B) -> Result<Self, StreamError> {
        let Some(raw) = RawStream::alloc() else {
            set_error(StreamError::Allocation.to_string());
            return Err(StreamError::Allocation);
        };
        let bridge: Box<Bridge<'a>> = Box::new(Bridge {
            backing: Box::new(backing),
        });
        // SAFETY: `raw` is a freshly allocated, exclusively owned table.
        unsafe {
            let table = raw.as_ptr();
            (*table).seek = Some(seek_trampoline);
            (*table).read = Some(read_trampoline);
            (*table).write = Some(write_trampoline);
            (*table).close = Some(close_trampoline);
            (*table).kind = RAW_STREAM_UNKNOWN;
            (*table).data1 = Box::into_raw(bridge).cast();
            (*table).data2 = lumen_tag();
        }
        log::debug!("Opened custom stream {:p}.", raw.as_ptr());
        Ok(Self {
            raw: Some(raw),
            _backing: PhantomData,
        })
    }

    /// Wraps a growable container (`Vec<u8>` or `&mut Vec<u8>`).
    pub fn from_container<C: BorrowMut<Vec<u8>> + 'a>(container: C) -> Result<Self, StreamError> {
        Self::new(ContainerStream::new(container))
    }

    /// Wraps read-only bytes.
    pub fn from_const<B: AsRef<[u8]> + 'a>(data: B) -> Result<Self, StreamError> {
        Self::new(ConstStream::new(data))
    }

    /// Wraps a fixed memory region.
    pub fn from_fixed(region: &'a mut [u8]) -> Result<Self, StreamError> {
        Self::new(FixedStream::new(region))
    }

    /// Wraps an input stream.
    pub fn from_reader<R: Read + Seek + 'a>(reader: R) -> Result<Self, StreamError> {
        Self::new(ReaderStream::new(reader))
    }

    /// Wraps an output stream.
    pub fn from_writer<W: Write + Seek + 'a>(writer: W) -> Result<Self, StreamError> {
        Self::new(WriterStream::new(writer))
    }

    /// Opens a file with an `fopen`-style mode.
    pub fn from_file(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        Self::new(FileStream::open(path, mode)?)
    }

    /// Takes ownership of a native stream table.
    ///
    /// # Safety
    /// `raw` must point to a live table whose close callback releases it, and
    /// nothing else may close it afterwards.
    pub unsafe fn from_raw(raw: NonNull<RawStream>) -> Self {
        Self {
            raw: Some(raw),
            _backing: PhantomData,
        }
    }

    /// Returns the native table, or null once closed.
    pub fn as_raw(&self) -> *mut RawStream {
        self.raw.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Releases ownership of the native table without closing it.
    ///
    /// The returned pointer carries no lifetime, so the borrow checker no
    /// longer ties it to the backing:
    ///
    /// ```compile_fail
    /// use lumen_io::RWops;
    ///
    /// let raw = RWops::from_const(&b"abc"[..]).unwrap().into_raw();
    /// ```
    ///
    /// # Safety
    /// The backing must outlive every use of the returned table, including
    /// the final [`raw_close`]. For a stream over borrowed storage
    /// (`&mut Vec<u8>`, `&[u8]`, `&mut [u8]`, a borrowed reader or writer)
    /// that borrowed value must still be alive at each `raw_*` call.
    pub unsafe fn into_raw(mut self) -> *mut RawStream {
        self.raw.take().map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Returns `true` if the table was created by [`RWops::new`].
    pub fn is_custom(&self) -> bool {
        // SAFETY: an owned, open table is live.
        self.raw
            .is_some_and(|raw| unsafe { (*raw.as_ptr()).data2 } == lumen_tag())
    }

    fn handle(&self) -> Result<*mut RawStream, StreamError> {
        self.raw.map(NonNull::as_ptr).ok_or_else(|| {
            set_error(StreamError::Closed.to_string());
            StreamError::Closed
        })
    }

    /// Moves the position and returns the new absolute position.
    ///
    /// # Errors
    /// Reports the backing's failure, taken from the ambient error string.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        let raw = self.handle()?;
        // SAFETY: `raw` is owned and open.
        let position = unsafe { raw_seek(raw, offset, whence.as_raw()) };
        u64::try_from(position).map_err(|_| StreamError::Native(get_error()))
    }

    /// Returns the current position.
    pub fn tell(&mut self) -> Result<u64, StreamError> {
        self.seek(0, Whence::Cur)
    }

    /// Returns the stream size, leaving the position unchanged.
    pub fn size(&mut self) -> Result<u64, StreamError> {
        let current = self.tell()?;
        let end = self.seek(0, Whence::End)?;
        let current = i64::try_from(current).map_err(|_| StreamError::PositionOutOfRange(current))?;
        self.seek(current, Whence::Set)?;
        Ok(end)
    }

    /// Reads up to `maxnum` elements of `size` bytes; returns whole elements read.
    pub fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        let Ok(raw) = self.handle() else {
            return 0;
        };
        let maxnum = clamp_elements(buf.len(), size, maxnum);
        // SAFETY: `buf` holds at least `size * maxnum` bytes.
        unsafe { raw_read(raw, buf.as_mut_ptr().cast(), size, maxnum) }
    }

    /// Writes `num` elements of `size` bytes; returns elements written.
    pub fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        let Ok(raw) = self.handle() else {
            return 0;
        };
        let num = clamp_elements(buf.len(), size, num);
        // SAFETY: `buf` holds at least `size * num` bytes.
        unsafe { raw_write(raw, buf.as_ptr().cast(), size, num) }
    }

    /// Closes the stream, releasing the backing and the native table.
    ///
    /// # Errors
    /// Reports the backing's close failure (for example a failed flush).
    pub fn close(mut self) -> Result<(), StreamError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), StreamError> {
        let Some(raw) = self.raw.take() else {
            return Ok(());
        };
        log::debug!("Closing stream {:p}.", raw.as_ptr());
        // SAFETY: `raw` was owned and is not used after this call.
        match unsafe { raw_close(raw.as_ptr()) } {
            0 => Ok(()),
            _ => Err(StreamError::Native(get_error())),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let mut bytes = [0u8; N];
        let got = self.read(&mut bytes, 1, N);
        if got != N {
            return Err(StreamError::ShortRead { expected: N, got });
        }
        Ok(bytes)
    }

    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), StreamError> {
        let written = self.write(&bytes, 1, N);
        if written != N {
            return Err(StreamError::ShortWrite {
                expected: N,
                written,
            });
        }
        Ok(())
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Writes one byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), StreamError> {
        self.write_array([value])
    }
}

macro_rules! endian_io {
    ($($read:ident, $write:ident, $ty:ty, $from:ident, $to:ident;)+) => {
        impl RWops<'_> {
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "` (`", stringify!($from), "`).")]
                pub fn $read(&mut self) -> Result<$ty, StreamError> {
                    self.read_array().map(<$ty>::$from)
                }

                #[doc = concat!("Writes a `", stringify!($ty), "` (`", stringify!($to), "`).")]
                pub fn $write(&mut self, value: $ty) -> Result<(), StreamError> {
                    self.write_array(value.$to())
                }
            )+
        }
    };
}

endian_io! {
    read_le16, write_le16, u16, from_le_bytes, to_le_bytes;
    read_be16, write_be16, u16, from_be_bytes, to_be_bytes;
    read_le32, write_le32, u32, from_le_bytes, to_le_bytes;
    read_be32, write_be32, u32, from_be_bytes, to_be_bytes;
    read_le64, write_le64, u64, from_le_bytes, to_le_bytes;
    read_be64, write_be64, u64, from_be_bytes, to_be_bytes;
}

impl Drop for RWops<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("Error while closing dropped stream: {err}");
        }
    }
}

impl std::fmt::Debug for RWops<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RWops")
            .field("raw", &self.as_raw())
            .finish_non_exhaustive()
    }
}

impl Read for RWops<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Backings report failures only through the ambient error, and a
        // clean end of data leaves it empty.
        clear_error();
        match RWops::read(self, buf, 1, buf.len()) {
            0 if !buf.is_empty() => match get_error() {
                message if message.is_empty() => Ok(0),
                message => Err(io::Error::other(message)),
            },
            read => Ok(read),
        }
    }
}

impl Write for RWops<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match RWops::write(self, buf, 1, buf.len()) {
            0 if !buf.is_empty() => Err(io::Error::other(get_error())),
            written => Ok(written),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for RWops<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(start) => (
                i64::try_from(start).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
                Whence::Set,
            ),
            SeekFrom::Current(offset) => (offset, Whence::Cur),
            SeekFrom::End(offset) => (offset, Whence::End),
        };
        RWops::seek(self, offset, whence).map_err(io::Error::other)
    }
}
