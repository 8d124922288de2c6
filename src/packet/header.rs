use std::io::BufRead;

use bitfields::bitfield;

use crate::errors::Result;
use crate::source::ByteSource;
use crate::types::{PacketHeaderVersion, PacketLength, Tag};

/// Old format ("legacy") control byte.
#[bitfield(u8, order = msb)]
#[derive(Clone, Copy, PartialEq, Eq)]
struct OldCtb {
    /// First bit is always 1
    #[bits(1, default = true)]
    _marker: bool,
    /// Format: 0
    #[bits(1, default = false)]
    _format: bool,
    /// Packet type
    #[bits(4)]
    tag: u8,
    /// Length-of-length selector
    #[bits(2)]
    length_type: u8,
}

/// New format control byte.
#[bitfield(u8, order = msb)]
#[derive(Clone, Copy, PartialEq, Eq)]
struct NewCtb {
    /// First bit is always 1
    #[bits(1, default = true)]
    _marker: bool,
    /// Format: 1
    #[bits(1, default = true)]
    _format: bool,
    /// Packet type
    #[bits(6)]
    tag: u8,
}

/// Verbatim control and length bytes, at most six: the control byte plus a
/// five byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawHeader {
    buf: [u8; 6],
    len: u8,
}

impl RawHeader {
    fn new(ctb: u8) -> Self {
        let mut buf = [0u8; 6];
        buf[0] = ctb;
        RawHeader { buf, len: 1 }
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.len as usize] = byte;
        self.len += 1;
    }

    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

/// A decoded packet header: framing convention, packet type, body length
/// descriptor, and the header bytes as they appeared on the wire (needed
/// for verbatim re-framing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    version: PacketHeaderVersion,
    tag: Tag,
    length: PacketLength,
    raw: RawHeader,
}

impl PacketHeader {
    /// Reads one packet header off the source.
    ///
    /// Bit 6 of the control byte selects the framing convention. Bodies
    /// without a definite length switch the source into the matching mode
    /// here: block mode for old format length-less bodies (except
    /// compressed data, whose stream delimits itself) and partial-block
    /// mode for new format partial bodies.
    ///
    /// Returns `Ok(None)` on a clean end of stream before the first byte; a
    /// stream that ends inside the header is an invalid packet.
    pub(crate) fn try_from_source<R: BufRead>(inp: &mut ByteSource<R>) -> Result<Option<Self>> {
        let Some(ctb) = inp.get()? else {
            return Ok(None);
        };
        ensure!(ctb & 0x80 != 0, "invalid packet (ctb={ctb:02x})");
        let mut raw = RawHeader::new(ctb);

        let header = if ctb & 0x40 != 0 {
            let tag = Tag::from(NewCtb::from_bits(ctb).tag());
            let c = length_byte(inp, &mut raw)?;
            let length = match c {
                // One-Octet Lengths
                0..=191 => PacketLength::Fixed(c.into()),
                // Two-Octet Lengths
                192..=223 => {
                    let b = length_byte(inp, &mut raw)?;
                    PacketLength::Fixed(((u32::from(c) - 192) << 8) + u32::from(b) + 192)
                }
                // Five-Octet Lengths
                255 => {
                    let mut len = 0u32;
                    for _ in 0..4 {
                        len = (len << 8) | u32::from(length_byte(inp, &mut raw)?);
                    }
                    PacketLength::Fixed(len)
                }
                // Partial Body Lengths
                _ => {
                    let first_chunk = 1u32 << (c & 0x1f);
                    inp.set_partial_block_mode(first_chunk);
                    PacketLength::Partial(first_chunk)
                }
            };
            PacketHeader {
                version: PacketHeaderVersion::New,
                tag,
                length,
                raw,
            }
        } else {
            let old = OldCtb::from_bits(ctb);
            let tag = Tag::from(old.tag());
            let length = if old.length_type() == 3 {
                // no length bytes; the compression layer delimits itself,
                // everything else runs to the end of input
                if tag != Tag::CompressedData {
                    inp.set_block_mode(true);
                }
                PacketLength::Indeterminate
            } else {
                let mut len = 0u32;
                for _ in 0..(1usize << old.length_type()) {
                    len = (len << 8) | u32::from(length_byte(inp, &mut raw)?);
                }
                PacketLength::Fixed(len)
            };
            PacketHeader {
                version: PacketHeaderVersion::Old,
                tag,
                length,
                raw,
            }
        };

        Ok(Some(header))
    }

    pub fn version(&self) -> PacketHeaderVersion {
        self.version
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn packet_length(&self) -> PacketLength {
        self.length
    }

    /// The header bytes exactly as they appeared on the wire.
    pub fn raw(&self) -> &[u8] {
        self.raw.as_slice()
    }

    pub(crate) fn body_limit(&self) -> Option<u32> {
        self.length.maybe_len()
    }
}

fn length_byte<R: BufRead>(inp: &mut ByteSource<R>, raw: &mut RawHeader) -> Result<u8> {
    match inp.get()? {
        Some(b) => {
            raw.push(b);
            Ok(b)
        }
        None => bail!("packet length byte missing"),
    }
}
