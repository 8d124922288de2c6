//! Positioned byte source with the framing modes of the packet layer.
//!
//! [`ByteSource`] wraps any [`BufRead`] and adds the two length-less body
//! modes of the wire format: block mode (an old format body that simply runs
//! to the end of input) and partial-block mode (a new format body split into
//! length-prefixed chunks). In partial-block mode the chunk boundaries are
//! invisible to callers; the source presents the rejoined logical body and
//! reverts to plain reading once the final chunk is consumed.
//!
//! [`BodyReader`] is a borrowed view over one packet body. It enforces the
//! declared length as a hard byte budget, so payload decoders cannot read
//! past their packet no matter how malformed the fields are.

use std::fmt;
use std::io::{self, BufRead, Read};

use crate::parsing_reader::BufReadParsing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Plain,
    Block,
    Partial { remaining: u32, last: bool },
}

pub struct ByteSource<R> {
    inner: R,
    offset: u64,
    mode: Mode,
}

impl<R: BufRead> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        ByteSource {
            inner,
            offset: 0,
            mode: Mode::Plain,
        }
    }

    /// Number of bytes consumed from the underlying reader, chunk headers
    /// included.
    pub fn tell(&self) -> u64 {
        self.offset
    }

    /// Reads a single byte, `None` at the (logical) end of input.
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        let buf = self.fill_buf()?;
        match buf.first().copied() {
            Some(b) => {
                self.consume(1);
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    /// Old format bodies without length bytes run until the end of input.
    pub fn set_block_mode(&mut self, on: bool) {
        self.mode = if on { Mode::Block } else { Mode::Plain };
    }

    /// New format partial bodies: the header parser passes the size of the
    /// first chunk, continuation lengths are decoded internally.
    pub fn set_partial_block_mode(&mut self, first_chunk: u32) {
        self.mode = Mode::Partial {
            remaining: first_chunk,
            last: false,
        };
    }

    /// True while either length-less mode is active.
    pub fn in_block_mode(&self) -> bool {
        !matches!(self.mode, Mode::Plain)
    }

    fn inner_u8(&mut self) -> io::Result<u8> {
        let buf = self.inner.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "partial length byte missing",
            ));
        };
        self.inner.consume(1);
        self.offset += 1;
        Ok(b)
    }

    /// Decodes the next chunk length. A chunk with a definite encoding is
    /// the final one.
    fn next_chunk(&mut self) -> io::Result<()> {
        let c = self.inner_u8()?;
        let (remaining, last) = match c {
            0..=191 => (u32::from(c), true),
            192..=223 => {
                let b = self.inner_u8()?;
                (((u32::from(c) - 192) << 8) + u32::from(b) + 192, true)
            }
            255 => {
                let mut len = 0u32;
                for _ in 0..4 {
                    len = (len << 8) | u32::from(self.inner_u8()?);
                }
                (len, true)
            }
            _ => (1u32 << (c & 0x1f), false),
        };
        self.mode = Mode::Partial { remaining, last };
        Ok(())
    }
}

impl<R: BufRead> BufRead for ByteSource<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        loop {
            match self.mode {
                Mode::Partial {
                    remaining: 0,
                    last: true,
                } => {
                    // the logical body is complete, the next packet header
                    // follows in plain mode
                    self.mode = Mode::Plain;
                    return Ok(&[]);
                }
                Mode::Partial {
                    remaining: 0,
                    last: false,
                } => self.next_chunk()?,
                _ => break,
            }
        }

        let buf = self.inner.fill_buf()?;
        if let Mode::Partial { remaining, .. } = self.mode {
            let cap = (remaining as usize).min(buf.len());
            return Ok(&buf[..cap]);
        }
        Ok(buf)
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.offset += amt as u64;
        if let Mode::Partial { remaining, .. } = &mut self.mode {
            *remaining = remaining.saturating_sub(amt as u32);
        }
    }
}

impl<R: BufRead> Read for ByteSource<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let buf = self.fill_buf()?;
        let n = buf.len().min(out.len());
        out[..n].copy_from_slice(&buf[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R> fmt::Debug for ByteSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("offset", &self.offset)
            .field("mode", &self.mode)
            .finish()
    }
}

/// A borrowed view over one packet body.
///
/// For bodies with a definite length the reader ends after exactly that many
/// bytes; for indeterminate and partial bodies it ends where the source's
/// mode ends. Streaming packets carry their `BodyReader` with them, which
/// keeps the source borrowed until the body has been dealt with.
pub struct BodyReader<'a, R> {
    source: &'a mut ByteSource<R>,
    limit: Option<u32>,
}

impl<'a, R: BufRead> BodyReader<'a, R> {
    pub(crate) fn new(source: &'a mut ByteSource<R>, limit: Option<u32>) -> Self {
        BodyReader { source, limit }
    }

    /// Bytes left in the budget, `None` when the length is unknown.
    pub fn remaining(&self) -> Option<u32> {
        self.limit
    }

    /// Reads a single byte, `None` once the body ends.
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        let buf = self.fill_buf()?;
        match buf.first().copied() {
            Some(b) => {
                self.consume(1);
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    /// Reads the remainder of the body. Errors if a definite length cannot
    /// be satisfied by the source.
    pub fn rest(&mut self) -> io::Result<bytes::BytesMut> {
        let out = BufReadParsing::rest(self)?;
        if self.limit.is_some_and(|l| l > 0) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "packet body ended early",
            ));
        }
        Ok(out)
    }

    /// Discards whatever is left of the body. Unlike [`Self::rest`] this is
    /// lenient about early end of input; it is the cleanup path that keeps
    /// the next packet's framing intact.
    pub fn drain(&mut self) -> io::Result<u64> {
        BufReadParsing::drain(self)
    }

    pub fn source(&self) -> &ByteSource<R> {
        self.source
    }
}

impl<R: BufRead> BufRead for BodyReader<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.limit == Some(0) {
            return Ok(&[]);
        }
        let buf = self.source.fill_buf()?;
        match self.limit {
            Some(limit) => {
                let cap = (limit as usize).min(buf.len());
                Ok(&buf[..cap])
            }
            None => Ok(buf),
        }
    }

    fn consume(&mut self, amt: usize) {
        self.source.consume(amt);
        if let Some(limit) = &mut self.limit {
            *limit = limit.saturating_sub(amt as u32);
        }
    }
}

impl<R: BufRead> Read for BodyReader<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let buf = self.fill_buf()?;
        let n = buf.len().min(out.len());
        out[..n].copy_from_slice(&buf[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R> fmt::Debug for BodyReader<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyReader")
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing_reader::BufReadParsing;

    #[test]
    fn test_plain_reads() {
        let mut src = ByteSource::new(&[0x01, 0x02, 0x03][..]);
        assert_eq!(src.get().unwrap(), Some(0x01));
        assert_eq!(src.tell(), 1);
        assert_eq!(src.read_be_u16().unwrap(), 0x0203);
        assert_eq!(src.get().unwrap(), None);
        assert_eq!(src.tell(), 3);
        assert!(!src.in_block_mode());
    }

    #[test]
    fn test_partial_chunks_rejoin() {
        // one byte, then a two byte chunk (0xe1 = 1 << 1), then a final
        // fixed chunk of three bytes
        let data = [0x41u8, 0xe1, 0x42, 0x43, 0x03, 0x44, 0x45, 0x46, 0x99];
        let mut src = ByteSource::new(&data[..]);
        src.set_partial_block_mode(1);
        assert!(src.in_block_mode());

        let body = src.rest().unwrap();
        assert_eq!(&body[..], b"ABCDEF");

        // the source reverted to plain mode and the trailing byte is intact
        assert!(!src.in_block_mode());
        assert_eq!(src.get().unwrap(), Some(0x99));
    }

    #[test]
    fn test_partial_five_octet_final_chunk() {
        let mut data = vec![0x41u8, 0xff, 0x00, 0x00, 0x00, 0x02, 0x42, 0x43];
        data.push(0x07);
        let mut src = ByteSource::new(&data[..]);
        src.set_partial_block_mode(1);

        let body = src.rest().unwrap();
        assert_eq!(&body[..], b"ABC");
        assert_eq!(src.get().unwrap(), Some(0x07));
    }

    #[test]
    fn test_partial_tell_counts_chunk_headers() {
        let data = [0x41u8, 0x01, 0x42];
        let mut src = ByteSource::new(&data[..]);
        src.set_partial_block_mode(1);
        src.rest().unwrap();
        assert_eq!(src.tell(), 3);
    }

    #[test]
    fn test_body_reader_budget() {
        let mut src = ByteSource::new(&[1u8, 2, 3, 4, 5][..]);
        let mut body = BodyReader::new(&mut src, Some(3));
        assert_eq!(body.remaining(), Some(3));
        assert_eq!(body.read_u8().unwrap(), 1);
        assert_eq!(body.remaining(), Some(2));
        assert_eq!(&body.rest().unwrap()[..], &[2, 3]);
        assert_eq!(body.get().unwrap(), None);
        // the bytes beyond the budget are untouched
        assert_eq!(src.get().unwrap(), Some(4));
    }

    #[test]
    fn test_body_reader_short_input() {
        let mut src = ByteSource::new(&[1u8, 2][..]);
        let mut body = BodyReader::new(&mut src, Some(5));
        let err = body.rest().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_body_reader_drain_is_lenient() {
        let mut src = ByteSource::new(&[1u8, 2][..]);
        let mut body = BodyReader::new(&mut src, Some(5));
        assert_eq!(body.drain().unwrap(), 2);
    }
}
