//! Request body streams and response body sinks.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;

/// A readable, possibly seekable byte stream supplying a request body.
///
/// The option translator only consumes bodies that are readable, seekable
/// and of known non-zero size; everything else is treated as an absent
/// payload rather than an error.
pub trait BodyStream {
    /// Whether the stream can be read at all.
    fn is_readable(&self) -> bool;

    /// Whether the cursor can be repositioned.
    fn is_seekable(&self) -> bool;

    /// Total size in bytes, if known.
    fn size(&self) -> Option<u64>;

    /// Reset the cursor to the start of the stream.
    fn rewind(&mut self) -> io::Result<()>;

    /// Read everything from the current cursor position to the end.
    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

/// An in-memory body stream backed by a cursor.
#[derive(Clone, Debug)]
pub struct MemoryBody {
    cursor: Cursor<Vec<u8>>,
}

impl MemoryBody {
    /// Wrap `content` into a stream positioned at the start.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            cursor: Cursor::new(content.into()),
        }
    }

    /// Current cursor position, mainly useful to observe rewinds.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Move the cursor to an arbitrary position.
    pub fn set_position(&mut self, position: u64) {
        self.cursor.set_position(position);
    }
}

impl BodyStream for MemoryBody {
    fn is_readable(&self) -> bool {
        true
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn size(&self) -> Option<u64> {
        Some(self.cursor.get_ref().len() as u64)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.cursor.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        Read::read_to_end(&mut self.cursor, buf)
    }
}

/// A writable byte sink receiving a response body.
///
/// Sinks also expose their accumulated contents so callers can read the
/// body back after the exchange completes.
pub trait BodySink {
    /// Whether the sink accepts writes.
    fn is_writable(&self) -> bool;

    /// Append `content` to the sink.
    fn write_all(&mut self, content: &[u8]) -> io::Result<()>;

    /// Everything written so far.
    fn contents(&self) -> Bytes;

    /// Clone this sink behind its trait object.
    fn clone_sink(&self) -> Box<dyn BodySink + Send>;
}

/// A growable in-memory sink; always writable.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BodySink for MemorySink {
    fn is_writable(&self) -> bool {
        true
    }

    fn write_all(&mut self, content: &[u8]) -> io::Result<()> {
        self.buffer.extend_from_slice(content);
        Ok(())
    }

    fn contents(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer)
    }

    fn clone_sink(&self) -> Box<dyn BodySink + Send> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_body_reports_size_and_rewinds() {
        let mut body = MemoryBody::new(b"hello".to_vec());
        assert_eq!(body.size(), Some(5));

        body.set_position(3);
        body.rewind().expect("rewind failed");
        assert_eq!(body.position(), 0);

        let mut buf = Vec::new();
        body.read_to_end(&mut buf).expect("read failed");
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn memory_sink_accumulates_writes() {
        let mut sink = MemorySink::new();
        sink.write_all(b"one ").expect("write failed");
        sink.write_all(b"two").expect("write failed");
        assert_eq!(sink.contents(), Bytes::from_static(b"one two"));
    }
}
