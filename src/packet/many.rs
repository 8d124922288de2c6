//! The dispatcher: reads framed packets off a [`ByteSource`] and decides,
//! per packet, between decoding, skipping and verbatim copying.

use std::io::{self, BufRead, Read, Write};

use log::debug;
use snafu::ResultExt;

use crate::errors::{Result, WriteSnafu};
use crate::list::{self, HexDump};
use crate::source::{BodyReader, ByteSource};
use crate::types::Tag;

use super::comment::Comment;
use super::compressed_data::CompressedData;
use super::header::PacketHeader;
use super::key::{self, ParsedKey, PublicKey, SecretKey};
use super::literal_data::LiteralData;
use super::one_pass_signature::OnePassSignature;
use super::packet_sum::Packet;
use super::public_key_encrypted_session_key::PublicKeyEncryptedSessionKey;
use super::signature::Signature;
use super::sym_encrypted_data::SymEncryptedData;
use super::sym_key_encrypted_session_key::SymKeyEncryptedSessionKey;
use super::trust::Trust;
use super::user_id::UserId;

/// Parses the next well-formed packet off the stream.
///
/// Returns `Ok(None)` once the source is cleanly exhausted. Deleted entries
/// (type 0) and types without a decoder are skipped silently; an error
/// leaves the source positioned at the next packet's header.
pub fn parse_packet<'a, R: BufRead>(inp: &'a mut ByteSource<R>) -> Result<Option<Packet<'a, R>>> {
    let header = loop {
        match step(inp, None, None, None, false)? {
            Step::Eof => return Ok(None),
            Step::Skipped | Step::Copied => continue,
            Step::Done(pkt) => return Ok(Some(pkt.into_packet())),
            Step::Streaming(header) => break header,
        }
    };
    decode_streaming(inp, header).map(Some)
}

/// Like [`parse_packet`], but only returns packets of the given type;
/// everything else is skipped. Also reports the stream offset of the
/// matched packet's first header byte.
pub fn search_packet<'a, R: BufRead>(
    inp: &'a mut ByteSource<R>,
    pkttype: Tag,
) -> Result<Option<(u64, Packet<'a, R>)>> {
    let mut pos = 0;
    let header = loop {
        match step(inp, Some(pkttype), Some(&mut pos), None, false)? {
            Step::Eof => return Ok(None),
            Step::Skipped | Step::Copied => continue,
            Step::Done(pkt) => return Ok(Some((pos, pkt.into_packet()))),
            Step::Streaming(header) => break header,
        }
    };
    let packet = decode_streaming(inp, header)?;
    Ok(Some((pos, packet)))
}

/// Copies all packets from `inp` to `out`, framing bytes included, thereby
/// dropping deleted entries.
pub fn copy_all_packets<R: BufRead, W: Write>(inp: &mut ByteSource<R>, out: &mut W) -> Result<()> {
    let out: &mut dyn Write = out;
    loop {
        if let Step::Eof = step(inp, None, None, Some(&mut *out), false)? {
            return Ok(());
        }
    }
}

/// Like [`copy_all_packets`], but stops in front of the first packet that
/// starts at or beyond `stop_offset`.
pub fn copy_some_packets<R: BufRead, W: Write>(
    inp: &mut ByteSource<R>,
    out: &mut W,
    stop_offset: u64,
) -> Result<()> {
    let out: &mut dyn Write = out;
    loop {
        if inp.tell() >= stop_offset {
            return Ok(());
        }
        if let Step::Eof = step(inp, None, None, Some(&mut *out), false)? {
            return Ok(());
        }
    }
}

/// Skips over the next `count` packets, whether they could be decoded or
/// not.
pub fn skip_some_packets<R: BufRead>(inp: &mut ByteSource<R>, count: u32) -> Result<()> {
    for _ in 0..count {
        if let Step::Eof = step(inp, None, None, None, true)? {
            return Ok(());
        }
    }
    Ok(())
}

/// Owned outcome of one dispatcher step. Streaming payloads are deferred so
/// the long borrow of the source only starts once skipping is over.
enum Step {
    Eof,
    Skipped,
    Copied,
    Done(OwnedPacket),
    Streaming(PacketHeader),
}

enum OwnedPacket {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
    OnePassSignature(OnePassSignature),
    /// The flag marks a subkey, taken from the header's tag.
    SecretKey(SecretKey, bool),
    PublicKey(PublicKey, bool),
    Trust(Trust),
    UserId(UserId),
    Comment(Comment),
}

impl OwnedPacket {
    fn into_packet<'a, R>(self) -> Packet<'a, R> {
        match self {
            Self::PublicKeyEncryptedSessionKey(p) => Packet::PublicKeyEncryptedSessionKey(p),
            Self::Signature(p) => Packet::Signature(p),
            Self::SymKeyEncryptedSessionKey(p) => Packet::SymKeyEncryptedSessionKey(p),
            Self::OnePassSignature(p) => Packet::OnePassSignature(p),
            Self::SecretKey(p, false) => Packet::SecretKey(p),
            Self::SecretKey(p, true) => Packet::SecretSubkey(p),
            Self::PublicKey(p, false) => Packet::PublicKey(p),
            Self::PublicKey(p, true) => Packet::PublicSubkey(p),
            Self::Trust(p) => Packet::Trust(p),
            Self::UserId(p) => Packet::UserId(p),
            Self::Comment(p) => Packet::Comment(p),
        }
    }
}

/// One header worth of progress: reads the header, applies the copy and
/// skip policies, and decodes non-streaming payloads.
fn step<R: BufRead>(
    inp: &mut ByteSource<R>,
    reqtype: Option<Tag>,
    retpos: Option<&mut u64>,
    out: Option<&mut dyn Write>,
    do_skip: bool,
) -> Result<Step> {
    if let Some(pos) = retpos {
        *pos = inp.tell();
    }
    let Some(header) = PacketHeader::try_from_source(inp)? else {
        return Ok(Step::Eof);
    };
    let tag = header.tag();
    let typ = u8::from(tag);

    if let Some(out) = out {
        if typ != 0 {
            out.write_all(header.raw()).context(WriteSnafu)?;
            copy_packet(inp, out, &header)?;
            return Ok(Step::Copied);
        }
        // deleted entries fall through to the skip below and vanish from
        // the copy
    }

    if do_skip || typ == 0 || reqtype.is_some_and(|want| want != tag) || !has_decoder(tag) {
        skip_packet(inp, &header)?;
        return Ok(Step::Skipped);
    }

    debug!(
        "parse packet: type={typ} length={:?}",
        header.packet_length()
    );

    if matches!(
        tag,
        Tag::LiteralData | Tag::CompressedData | Tag::SymEncryptedData
    ) {
        return Ok(Step::Streaming(header));
    }

    let mut body = BodyReader::new(inp, header.body_limit());
    let decoded = decode(tag, header, &mut body);
    // drain whatever the decoder left over, error or not, so the next
    // packet's framing stays intact
    let drained = body.drain();
    let decoded = decoded?;
    drained?;

    match decoded {
        Some(pkt) => Ok(Step::Done(pkt)),
        None => Ok(Step::Skipped),
    }
}

fn has_decoder(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::PublicKeyEncryptedSessionKey
            | Tag::Signature
            | Tag::SymKeyEncryptedSessionKey
            | Tag::OnePassSignature
            | Tag::SecretKey
            | Tag::PublicKey
            | Tag::SecretSubkey
            | Tag::PublicSubkey
            | Tag::Trust
            | Tag::UserId
            | Tag::OldComment
            | Tag::Comment
            | Tag::LiteralData
            | Tag::CompressedData
            | Tag::SymEncryptedData
    )
}

fn decode<R: BufRead>(
    tag: Tag,
    header: PacketHeader,
    body: &mut BodyReader<'_, R>,
) -> Result<Option<OwnedPacket>> {
    let pkt = match tag {
        Tag::PublicKeyEncryptedSessionKey => OwnedPacket::PublicKeyEncryptedSessionKey(
            PublicKeyEncryptedSessionKey::from_body(header, body)?,
        ),
        Tag::Signature => OwnedPacket::Signature(Signature::from_body(header, body)?),
        Tag::SymKeyEncryptedSessionKey => OwnedPacket::SymKeyEncryptedSessionKey(
            SymKeyEncryptedSessionKey::from_body(header, body)?,
        ),
        Tag::OnePassSignature => {
            OwnedPacket::OnePassSignature(OnePassSignature::from_body(header, body)?)
        }
        Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey | Tag::SecretSubkey => {
            let subkey = matches!(tag, Tag::PublicSubkey | Tag::SecretSubkey);
            match key::parse_key(header, body)? {
                Some(ParsedKey::Public(k)) => OwnedPacket::PublicKey(k, subkey),
                Some(ParsedKey::Secret(k)) => OwnedPacket::SecretKey(k, subkey),
                None => return Ok(None),
            }
        }
        Tag::Trust => OwnedPacket::Trust(Trust::from_body(header, body)?),
        Tag::UserId => OwnedPacket::UserId(UserId::from_body(header, body)?),
        Tag::OldComment | Tag::Comment => OwnedPacket::Comment(Comment::from_body(header, body)?),
        other => {
            return Err(crate::errors::UnknownPacketSnafu {
                typ: u8::from(other),
            }
            .build())
        }
    };
    Ok(Some(pkt))
}

fn decode_streaming<'a, R: BufRead>(
    inp: &'a mut ByteSource<R>,
    header: PacketHeader,
) -> Result<Packet<'a, R>> {
    let body = BodyReader::new(inp, header.body_limit());
    match header.tag() {
        Tag::LiteralData => LiteralData::from_body(header, body).map(Packet::LiteralData),
        Tag::CompressedData => CompressedData::from_body(header, body).map(Packet::CompressedData),
        Tag::SymEncryptedData => {
            SymEncryptedData::from_body(header, body).map(Packet::SymEncryptedData)
        }
        other => Err(crate::errors::UnknownPacketSnafu {
            typ: u8::from(other),
        }
        .build()),
    }
}

/// Verbatim body copy. The header bytes were already written; the policy
/// per length descriptor is the same as for skipping, except that running
/// out of input inside a definite length is a hard error here.
fn copy_packet<R: BufRead>(
    inp: &mut ByteSource<R>,
    out: &mut dyn Write,
    header: &PacketHeader,
) -> Result<()> {
    let mut body = BodyReader::new(inp, header.body_limit());
    let mut buf = [0u8; 4096];
    loop {
        let n = body.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).context(WriteSnafu)?;
    }
    if body.remaining().is_some_and(|r| r > 0) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "packet body ended early",
        )
        .into());
    }
    Ok(())
}

/// Skips one packet body. In list mode skipped packets of nonzero type get
/// a hex dump, since there is nothing better to show for them.
fn skip_packet<R: BufRead>(inp: &mut ByteSource<R>, header: &PacketHeader) -> Result<()> {
    let mut body = BodyReader::new(inp, header.body_limit());
    let typ = u8::from(header.tag());

    if list::list_mode() {
        println!(
            ":unknown packet: type {typ:2}, length {}",
            header.body_limit().unwrap_or(0)
        );
        if typ != 0 {
            print!("dump:");
            let mut dump = HexDump::new();
            loop {
                match body.get()? {
                    Some(b) => dump.push(Some(b)),
                    None => {
                        if body.remaining().is_some_and(|r| r > 0) {
                            dump.push(None);
                        }
                        break;
                    }
                }
            }
            println!();
            return Ok(());
        }
    }

    body.drain()?;
    Ok(())
}
