use std::fmt;
use std::io::{self, BufRead, Read};

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, TimeZone, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Literal Data Packet
///
/// Only the leading fields (mode, name, timestamp) are decoded; the data
/// itself stays in the stream. The packet carries the still-borrowed body
/// reader, so the caller streams the content out at its own pace and the
/// source cannot be advanced past it by accident.
pub struct LiteralData<'a, R> {
    packet_header: PacketHeader,
    pub mode: DataMode,
    /// May contain non UTF-8 bytes and may have been truncated to fit the
    /// declared packet length.
    pub file_name: Bytes,
    pub created: DateTime<Utc>,
    /// Remaining data length; `None` when the enclosing body length is
    /// unknown.
    pub len: Option<u32>,
    body: BodyReader<'a, R>,
}

#[derive(Debug, Copy, Clone, FromPrimitive, IntoPrimitive, PartialEq, Eq)]
#[repr(u8)]
pub enum DataMode {
    Binary = b'b',
    Text = b't',

    #[num_enum(catch_all)]
    Other(u8),
}

impl<'a, R: BufRead> LiteralData<'a, R> {
    pub(crate) fn from_body(packet_header: PacketHeader, mut body: BodyReader<'a, R>) -> Result<Self> {
        let (mode, file_name, created) = match read_fields(&mut body) {
            Ok(fields) => fields,
            Err(err) => {
                let _ = body.drain();
                return Err(err);
            }
        };
        let len = body.remaining();

        if list::list_mode() {
            let mode_byte = u8::from(mode);
            let mode_char = if (b' '..b'z').contains(&mode_byte) {
                mode_byte as char
            } else {
                '?'
            };
            println!(":literal data packet:");
            println!(
                "\tmode {mode_char}, created {}, name=\"{}\",",
                created.timestamp(),
                list::escape_to_string(&file_name)
            );
            println!("\traw data: {} bytes", len.unwrap_or(0));
        }

        Ok(LiteralData {
            packet_header,
            mode,
            file_name,
            created,
            len,
            body,
        })
    }

    /// The undecoded data, positioned at its first byte.
    pub fn body(&mut self) -> &mut BodyReader<'a, R> {
        &mut self.body
    }
}

fn read_fields<R: BufRead>(
    body: &mut BodyReader<'_, R>,
) -> Result<(DataMode, Bytes, DateTime<Utc>)> {
    if let Some(remaining) = body.remaining() {
        ensure!(
            remaining >= 6,
            "literal data packet too short ({remaining} bytes)"
        );
    }
    let mode = DataMode::from(body.read_u8()?);
    let name_len = usize::from(body.read_u8()?);

    let file_name = match body.remaining() {
        Some(remaining) => {
            // never eat into the timestamp: with a definite length the name
            // is truncated to whatever fits in front of those four bytes
            let take = name_len.min(remaining.saturating_sub(4) as usize);
            body.take_bytes(take)?.freeze()
        }
        None => {
            let mut name = BytesMut::with_capacity(name_len);
            for _ in 0..name_len {
                match body.get()? {
                    Some(b) => name.extend_from_slice(&[b]),
                    None => break,
                }
            }
            name.freeze()
        }
    };

    let created = body.read_be_u32()?;
    let created = Utc
        .timestamp_opt(i64::from(created), 0)
        .single()
        .ok_or_else(|| format_err!("invalid created field"))?;

    Ok((mode, file_name, created))
}

impl<R: BufRead> Read for LiteralData<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl<R: BufRead> BufRead for LiteralData<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.body.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.body.consume(amt)
    }
}

impl<R> fmt::Debug for LiteralData<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteralData")
            .field("mode", &self.mode)
            .field("file_name", &String::from_utf8_lossy(&self.file_name))
            .field("created", &self.created)
            .field("len", &self.len)
            .finish()
    }
}

impl<R> PacketTrait for LiteralData<'_, R> {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
