use core::fmt;

use super::{Error, Result};

/// Destination of the serialized bytes
pub(crate) trait SerializerBackend {
    /// Return the current amount of serialized data
    fn end(&self) -> usize;

    /// Append `other` as a single fragment, or fail without writing any of it
    fn extend_from_slice(&mut self, other: &[u8]) -> Result<()>;

    fn push(&mut self, c: u8) -> Result<()> {
        self.extend_from_slice(&[c])
    }
}

/// Writes into a caller owned slice, always keeping one byte free for the terminator
pub(crate) struct SliceWriter<'a> {
    buf: &'a mut [u8],
    current_length: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            current_length: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.current_length
    }

    /// Write the NUL terminator after the serialized data
    pub fn terminate(&mut self) {
        if let Some(b) = self.buf.get_mut(self.current_length) {
            *b = 0;
        }
    }
}

impl<'a> SerializerBackend for SliceWriter<'a> {
    fn end(&self) -> usize {
        self.current_length
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> Result<()> {
        if other.len() >= self.remaining() {
            // won't fit in the buf; don't modify anything and return an error
            return Err(Error::BufferTooSmall);
        }

        let start = self.current_length;
        self.buf[start..start + other.len()].copy_from_slice(other);
        self.current_length += other.len();
        Ok(())
    }
}

/// Counts the bytes a serialization would produce without storing them
#[derive(Default)]
pub(crate) struct LengthCounter {
    current_length: usize,
}

impl SerializerBackend for LengthCounter {
    fn end(&self) -> usize {
        self.current_length
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> Result<()> {
        self.current_length += other.len();
        Ok(())
    }
}

/// `fmt::Write` adapter so `write!` output goes through the checked append
pub(crate) struct FmtWriter<'a, B>(pub &'a mut B);

impl<'a, B: SerializerBackend> fmt::Write for FmtWriter<'a, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
