//! Binary capture-log codec.
//!
//! A capture log is a plain sequence of frames with no file header, trailer
//! or checksum:
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0 | 8 | Timestamp, seconds since capture start (u64 LE) |
//! | 8 | 2 | Payload length (u16 LE) |
//! | 10 | length | Raw LE Meta event payload |
//!
//! Frame boundaries are not self-describing, so a log can only be read
//! sequentially from offset 0 and a short payload ends the read.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Size of the fixed frame header.
pub const FRAME_HEADER_LEN: usize = 10;

/// Largest payload a frame can carry.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// One timestamped captured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since capture start.
    pub timestamp: u64,
    /// Raw event payload.
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(timestamp: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            payload: payload.into(),
        }
    }

    /// Encoded size of this frame on disk.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.len()
    }
}

/// Appends frames to a capture log.
pub struct LogWriter<W: Write> {
    inner: W,
    frames_written: u64,
}

impl LogWriter<BufWriter<File>> {
    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LogWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            frames_written: 0,
        }
    }

    /// Append one frame and flush it.
    ///
    /// The header and payload go out in a single `write_all`. If that fails
    /// part-way, the log is truncated at this frame; there is no rollback.
    pub fn write_frame(&mut self, timestamp: u64, payload: &[u8]) -> Result<()> {
        let len =
            u16::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge(payload.len()))?;

        let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.put_u64_le(timestamp);
        buf.put_u16_le(len);
        buf.put_slice(payload);

        self.inner.write_all(&buf)?;
        self.inner.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    /// Convenience wrapper for [`write_frame`](Self::write_frame).
    pub fn write(&mut self, frame: &Frame) -> Result<()> {
        self.write_frame(frame.timestamp, &frame.payload)
    }

    /// Number of frames successfully written.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads frames from a capture log, front to back.
///
/// Also an [`Iterator`] over `Result<Frame>`. The iterator ends at end of
/// log and yields at most one error, after which it is exhausted.
pub struct LogReader<R: Read> {
    inner: R,
    offset: u64,
    done: bool,
}

impl LogReader<BufReader<File>> {
    /// Open a log file for reading from offset 0.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> LogReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` once fewer than [`FRAME_HEADER_LEN`] bytes remain,
    /// and [`Error::CorruptFrame`] when the payload is shorter than declared.
    /// After either outcome, or an I/O error, every later call returns
    /// `Ok(None)`.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.done {
            return Ok(None);
        }

        let mut header = [0u8; FRAME_HEADER_LEN];
        let got = read_full(&mut self.inner, &mut header).inspect_err(|_| self.done = true)?;
        if got < FRAME_HEADER_LEN {
            if got > 0 {
                debug!(
                    offset = self.offset,
                    bytes = got,
                    "Ignoring partial frame header at end of log"
                );
            }
            self.done = true;
            return Ok(None);
        }

        let mut buf = &header[..];
        let timestamp = buf.get_u64_le();
        let expected = buf.get_u16_le() as usize;

        let mut payload = vec![0u8; expected];
        let actual = read_full(&mut self.inner, &mut payload).inspect_err(|_| self.done = true)?;
        if actual < expected {
            self.done = true;
            return Err(Error::CorruptFrame {
                offset: self.offset,
                expected,
                actual,
            });
        }

        self.offset += (FRAME_HEADER_LEN + expected) as u64;
        Ok(Some(Frame { timestamp, payload }))
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Fill `buf` as far as the reader allows, returning the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(frames: &[Frame]) -> Vec<u8> {
        let mut writer = LogWriter::new(Vec::new());
        for frame in frames {
            writer.write(frame).unwrap();
        }
        writer.into_inner().unwrap()
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&[Frame::new(0x0102, vec![0xAA, 0xBB, 0xCC])]);
        assert_eq!(
            bytes,
            [0x02, 0x01, 0, 0, 0, 0, 0, 0, 0x03, 0x00, 0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn test_read_back_multiple_frames() {
        let frames = vec![
            Frame::new(0, vec![1, 2, 3]),
            Frame::new(0, vec![]),
            Frame::new(5, vec![9; 300]),
        ];
        let reader = LogReader::new(Cursor::new(encode(&frames)));
        let read: Vec<Frame> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(read, frames);
    }

    #[test]
    fn test_empty_log_is_end_of_log() {
        let mut reader = LogReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_partial_header_is_end_of_log() {
        let mut bytes = encode(&[Frame::new(1, vec![7])]);
        bytes.extend_from_slice(&[0x01, 0x02, 0x03]);
        let mut reader = LogReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_frame().unwrap(), Some(Frame::new(1, vec![7])));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_short_payload_is_corrupt_and_fuses() {
        let mut bytes = encode(&[Frame::new(1, vec![7, 7])]);
        bytes.extend_from_slice(&[0x02, 0, 0, 0, 0, 0, 0, 0, 0x05, 0x00, 0xAA]);
        let mut reader = LogReader::new(Cursor::new(bytes));

        assert!(reader.read_frame().unwrap().is_some());
        match reader.read_frame() {
            Err(Error::CorruptFrame {
                offset,
                expected,
                actual,
            }) => {
                assert_eq!(offset, 12);
                assert_eq!(expected, 5);
                assert_eq!(actual, 1);
            }
            other => panic!("expected corrupt frame, got {:?}", other),
        }
        assert!(reader.read_frame().unwrap().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_iterator_keeps_frames_before_corruption() {
        let mut bytes = encode(&[Frame::new(1, vec![1]), Frame::new(2, vec![2])]);
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0xFF, 0xFF]);
        let results: Vec<_> = LogReader::new(Cursor::new(bytes)).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }

    #[test]
    fn test_payload_too_large_writes_nothing() {
        let mut writer = LogWriter::new(Vec::new());
        let err = writer.write_frame(0, &vec![0; MAX_PAYLOAD_LEN + 1]).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(65536)));
        assert_eq!(writer.frames_written(), 0);
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn test_max_payload_round_trips() {
        let frame = Frame::new(u64::MAX, vec![0x5A; MAX_PAYLOAD_LEN]);
        let bytes = encode(std::slice::from_ref(&frame));
        assert_eq!(bytes.len(), frame.encoded_len());
        let mut reader = LogReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_frame().unwrap(), Some(frame));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let mut writer = LogWriter::new(FailingWriter);
        let err = writer.write_frame(1, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(writer.frames_written(), 0);
    }
}
