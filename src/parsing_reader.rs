//! Fixed-size read helpers shared by the header and payload decoders.
//!
//! Everything here fails hard with [`std::io::ErrorKind::UnexpectedEof`]
//! when the input runs dry, so a truncated body can never decode into a
//! zero-filled record.

use std::io::{self, BufRead};

use bytes::{BufMut, BytesMut};

pub trait BufReadParsing: BufRead + Sized {
    fn read_u8(&mut self) -> io::Result<u8> {
        let arr = self.read_array::<1>()?;
        Ok(arr[0])
    }

    fn read_be_u16(&mut self) -> io::Result<u16> {
        let arr = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(arr))
    }

    fn read_be_u32(&mut self) -> io::Result<u32> {
        let arr = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(arr))
    }

    fn has_remaining(&mut self) -> io::Result<bool> {
        let has_remaining = !self.fill_buf()?.is_empty();
        Ok(has_remaining)
    }

    fn read_array<const C: usize>(&mut self) -> io::Result<[u8; C]> {
        let mut arr = [0u8; C];
        let mut read = 0;

        while read < arr.len() {
            let buf = self.fill_buf()?;
            if buf.is_empty() {
                break;
            }

            let available = (arr.len() - read).min(buf.len());
            arr[read..read + available].copy_from_slice(&buf[..available]);
            read += available;
            self.consume(available);
        }
        if read != arr.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more data available",
            ));
        }

        Ok(arr)
    }

    fn take_bytes(&mut self, size: usize) -> io::Result<BytesMut> {
        let mut out = BytesMut::zeroed(size);
        let mut read = 0;

        while read < out.len() {
            let buf = self.fill_buf()?;
            if buf.is_empty() {
                break;
            }

            let available = (out.len() - read).min(buf.len());
            out[read..read + available].copy_from_slice(&buf[..available]);
            read += available;
            self.consume(available);
        }

        if read != out.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more data available",
            ));
        }

        Ok(out)
    }

    /// Reads to the end of this reader's input.
    fn rest(&mut self) -> io::Result<BytesMut> {
        let out = BytesMut::new();
        let mut writer = out.writer();
        io::copy(self, &mut writer)?;
        Ok(writer.into_inner())
    }

    /// Discards everything left in this reader.
    fn drain(&mut self) -> io::Result<u64> {
        let mut out = io::sink();
        io::copy(self, &mut out)
    }
}

impl<B: BufRead> BufReadParsing for B {}
