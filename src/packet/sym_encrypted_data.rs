use std::fmt;
use std::io::{self, BufRead, Read};

use crate::errors::Result;
use crate::list;
use crate::source::BodyReader;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Symmetrically Encrypted Data Packet
///
/// The ciphertext is not consumed; the packet hands it back as the body
/// reader. The leading ten bytes of a definite-length body are the random
/// prefix plus its repeated check bytes, so anything shorter cannot be a
/// valid packet.
pub struct SymEncryptedData<'a, R> {
    packet_header: PacketHeader,
    /// Declared body length including the random prefix; `None` when
    /// unknown.
    pub len: Option<u32>,
    body: BodyReader<'a, R>,
}

impl<'a, R: BufRead> SymEncryptedData<'a, R> {
    pub(crate) fn from_body(packet_header: PacketHeader, mut body: BodyReader<'a, R>) -> Result<Self> {
        let len = body.remaining();
        if let Some(l) = len {
            if l < 10 {
                let _ = body.drain();
                bail!("encrypted data packet too short ({l} bytes)");
            }
        }

        if list::list_mode() {
            println!(":encrypted data packet:");
            match len {
                Some(l) => println!("\tlength: {}", l - 10),
                None => println!("\tlength: unknown"),
            }
        }

        Ok(SymEncryptedData {
            packet_header,
            len,
            body,
        })
    }

    /// The ciphertext, positioned at its first byte.
    pub fn body(&mut self) -> &mut BodyReader<'a, R> {
        &mut self.body
    }
}

impl<R: BufRead> Read for SymEncryptedData<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl<R: BufRead> BufRead for SymEncryptedData<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.body.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.body.consume(amt)
    }
}

impl<R> fmt::Debug for SymEncryptedData<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymEncryptedData")
            .field("len", &self.len)
            .finish()
    }
}

impl<R> PacketTrait for SymEncryptedData<'_, R> {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
