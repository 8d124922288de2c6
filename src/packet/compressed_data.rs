use std::fmt;
use std::io::{self, BufRead, Read};

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::CompressionAlgorithm;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Compressed Data Packet
///
/// Decompression is not this crate's business; after the algorithm byte the
/// compressed stream is handed back as the packet's body. Old format
/// compressed packets usually come without any length at all, the
/// compression layer terminates itself.
pub struct CompressedData<'a, R> {
    packet_header: PacketHeader,
    pub algorithm: CompressionAlgorithm,
    body: BodyReader<'a, R>,
}

impl<'a, R: BufRead> CompressedData<'a, R> {
    pub(crate) fn from_body(packet_header: PacketHeader, mut body: BodyReader<'a, R>) -> Result<Self> {
        let algorithm = match body.read_u8() {
            Ok(b) => CompressionAlgorithm::from(b),
            Err(err) => {
                let _ = body.drain();
                return Err(err.into());
            }
        };

        if list::list_mode() {
            println!(":compressed packet: algo={}", u8::from(algorithm));
        }

        Ok(CompressedData {
            packet_header,
            algorithm,
            body,
        })
    }

    /// The compressed stream, positioned right after the algorithm byte.
    pub fn body(&mut self) -> &mut BodyReader<'a, R> {
        &mut self.body
    }
}

impl<R: BufRead> Read for CompressedData<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl<R: BufRead> BufRead for CompressedData<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.body.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.body.consume(amt)
    }
}

impl<R> fmt::Debug for CompressedData<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedData")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl<R> PacketTrait for CompressedData<'_, R> {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
