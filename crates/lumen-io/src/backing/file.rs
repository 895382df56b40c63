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

//! A file backing opened with a C-style mode string.

use super::io_stream::{read_elements, seek_stream, write_elements};
use lumen_core::error::set_error;
use lumen_core::stream::{StreamBacking, StreamError, Whence};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Access rights parsed from an `fopen`-style mode (`"r"`, `"wb"`, `"a+"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode {
    /// The file may be read.
    pub read: bool,
    /// The file may be written.
    pub write: bool,
    /// Every write goes to the end of the file.
    pub append: bool,
    /// The file is truncated on open.
    pub truncate: bool,
    /// The file is created if missing.
    pub create: bool,
}

impl FileMode {
    /// Parses a mode string. `b` and `t` flags are accepted and ignored.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidMode`] for anything `fopen` would reject.
    pub fn parse(mode: &str) -> Result<Self, StreamError> {
        let base: String = mode.chars().filter(|c| !matches!(c, 'b' | 't')).collect();
        let parsed = match base.as_str() {
            "r" => Self::new(true, false, false, false, false),
            "w" => Self::new(false, true, false, true, true),
            "a" => Self::new(false, true, true, false, true),
            "r+" => Self::new(true, true, false, false, false),
            "w+" => Self::new(true, true, false, true, true),
            "a+" => Self::new(true, true, true, false, true),
            _ => return Err(StreamError::InvalidMode(mode.to_string())),
        };
        Ok(parsed)
    }

    const fn new(read: bool, write: bool, append: bool, truncate: bool, create: bool) -> Self {
        Self {
            read,
            write,
            append,
            truncate,
            create,
        }
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create);
        options
    }
}

/// A file on disk.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    mode: FileMode,
    failed: bool,
}

impl FileStream {
    /// Opens `path` with an `fopen`-style `mode`.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidMode`] for a bad mode string, or
    /// [`StreamError::Io`] if the file cannot be opened. Either way the
    /// message is also stored as the ambient error.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let result = FileMode::parse(mode).and_then(|parsed| {
            let file = parsed.open_options().open(path)?;
            Ok(Self {
                file,
                mode: parsed,
                failed: false,
            })
        });
        match &result {
            Ok(_) => log::debug!("Opened '{}' with mode '{mode}'.", path.display()),
            Err(err) => set_error(format!("Couldn't open '{}': {err}", path.display())),
        }
        result
    }

    /// Returns the mode the file was opened with.
    pub fn mode(&self) -> FileMode {
        self.mode
    }
}

impl StreamBacking for FileStream {
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        seek_stream(&mut self.file, offset, whence)
    }

    fn read(&mut self, buf: &mut [u8], size: usize, maxnum: usize) -> usize {
        if !self.mode.read {
            set_error("File is not open for reading");
            return 0;
        }
        read_elements(&mut self.file, &mut self.failed, buf, size, maxnum)
    }

    fn write(&mut self, buf: &[u8], size: usize, num: usize) -> usize {
        if !self.mode.write {
            set_error("File is not open for writing");
            return 0;
        }
        write_elements(&mut self.file, &mut self.failed, buf, size, num)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.file.flush()?;
        if self.failed {
            return Err(StreamError::BadState);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_fopen_modes() {
        assert_eq!(
            FileMode::parse("rb").ok(),
            Some(FileMode::new(true, false, false, false, false))
        );
        assert_eq!(
            FileMode::parse("w+b").ok(),
            Some(FileMode::new(true, true, false, true, true))
        );
        assert!(FileMode::parse("a+").is_ok_and(|m| m.append && m.read));
    }

    #[test]
    fn parse_rejects_unknown_modes() {
        assert!(matches!(
            FileMode::parse("rw"),
            Err(StreamError::InvalidMode(m)) if m == "rw"
        ));
        assert!(FileMode::parse("").is_err());
    }

    #[test]
    fn write_then_reopen_and_read() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data.bin");

        let mut out = FileStream::open(&path, "wb").expect("open for writing");
        assert_eq!(out.write(b"ABCDEFGH", 4, 2), 2);
        assert_eq!(out.read(&mut [0u8; 4], 1, 4), 0);
        out.close().expect("close");

        let mut input = FileStream::open(&path, "rb").expect("open for reading");
        assert_eq!(input.seek(-4, Whence::End).ok(), Some(4));
        let mut buf = [0u8; 4];
        assert_eq!(input.read(&mut buf, 4, 1), 1);
        assert_eq!(&buf, b"EFGH");
        assert_eq!(input.write(b"x", 1, 1), 0);
    }

    #[test]
    fn missing_file_sets_ambient_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = FileStream::open(dir.path().join("absent.bin"), "r");
        assert!(matches!(result, Err(StreamError::Io(_))));
        assert!(lumen_core::get_error().starts_with("Couldn't open"));
    }
}
