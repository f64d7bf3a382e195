//! Byte input from a file, with the position bookkeeping `Document` needs.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek};
use std::path::Path;

/// A buffered, read-only byte stream over a file.
///
/// Mark and reset are not supported: [`FileStream::mark_supported`] is
/// `false` and [`FileStream::reset`] fails. Reading a closed stream fails
/// with [`ErrorKind::NotConnected`].
#[derive(Debug)]
pub struct FileStream {
    file: Option<BufReader<File>>,
    len: u64,
    pos: u64,
}

fn closed() -> io::Error {
    io::Error::new(ErrorKind::NotConnected, "file stream is closed")
}

impl FileStream {
    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// Wraps an open file, starting at its current position.
    pub fn from_file(mut file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        let pos = file.stream_position()?;
        Ok(Self {
            file: Some(BufReader::new(file)),
            len,
            pos,
        })
    }

    /// `true` until [`FileStream::close`] is called.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }

    /// Closes the file. Closing twice is fine.
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Bytes left before the end of the file; zero once closed.
    #[must_use]
    pub fn available(&self) -> u64 {
        if self.is_valid() {
            self.len.saturating_sub(self.pos)
        } else {
            0
        }
    }

    /// Always `false`.
    #[must_use]
    pub fn mark_supported(&self) -> bool {
        false
    }

    /// Does nothing: marks are not supported.
    pub fn mark(&mut self, _read_limit: usize) {}

    /// Always fails with [`ErrorKind::Unsupported`].
    pub fn reset(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            ErrorKind::Unsupported,
            "file streams do not support mark/reset",
        ))
    }

    /// Skips up to `n` bytes and returns how many were skipped.
    pub fn skip(&mut self, n: u64) -> io::Result<u64> {
        let n = n.min(self.available());
        let file = self.file.as_mut().ok_or_else(closed)?;
        let offset = i64::try_from(n).map_err(|_| io::Error::from(ErrorKind::InvalidInput))?;
        file.seek_relative(offset)?;
        self.pos += n;
        Ok(n)
    }

    /// The next byte, or `None` at the end of the file.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Reads up to `len` bytes into `buf[offset..offset + len]`.
    pub fn read_range(&mut self, buf: &mut [u8], offset: usize, len: usize) -> io::Result<usize> {
        let capacity = buf.len();
        let range = offset
            .checked_add(len)
            .and_then(|end| buf.get_mut(offset..end));
        match range {
            Some(target) => self.read(target),
            None => Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("range {offset}..{offset}+{len} is outside a buffer of {capacity}"),
            )),
        }
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(closed)?;
        let n = file.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}
