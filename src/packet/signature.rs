use std::io::BufRead;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeZone, Utc};
use log::warn;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::{HashAlgorithm, KeyId, Mpi, PublicKeyAlgorithm};

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;
use super::subpacket::{list_sig_subpackets, parse_sig_subpacket, SubpacketType};

/// Upper bound for each of the v4 subpacket areas.
const MAX_SUBPACKET_AREA: u16 = 10_000;

/// Signature Packet
///
/// v2/v3 signatures carry timestamp and issuer inline; v4 signatures carry
/// them in the hashed respectively unhashed subpacket area. Both areas are
/// retained in their on-wire form, length prefix included, because that is
/// the exact byte string a later verification has to hash.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Signature {
    packet_header: PacketHeader,
    pub version: u8,
    /// Number of timestamp bytes hashed into v2/v3 signatures; 0 for v4.
    pub md5_len: u8,
    pub sig_class: u8,
    pub created: Option<DateTime<Utc>>,
    pub key_id: Option<KeyId>,
    pub pubkey_algo: PublicKeyAlgorithm,
    pub digest_algo: HashAlgorithm,
    /// First two bytes of the digest, a cheap mismatch check.
    pub digest_start: [u8; 2],
    #[debug("{:?}", hashed.as_ref().map(hex::encode))]
    pub hashed: Option<Bytes>,
    #[debug("{:?}", unhashed.as_ref().map(hex::encode))]
    pub unhashed: Option<Bytes>,
    pub params: SignatureParams,
}

/// The algorithm-specific signature integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParams {
    Elgamal { a: Mpi, b: Mpi },
    Dsa { r: Mpi, s: Mpi },
    Rsa { c: Mpi },
    /// Unrecognized algorithm; the payload was drained without decoding.
    Unknown,
}

impl Signature {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        if let Some(remaining) = body.remaining() {
            ensure!(remaining >= 16, "signature packet too short");
        }
        let version = body.read_u8()?;
        let is_v4 = version == 4;
        ensure!(
            matches!(version, 2 | 3 | 4),
            "signature packet with unknown version {version}"
        );

        let md5_len = if is_v4 { 0 } else { body.read_u8()? };
        let sig_class = body.read_u8()?;
        let mut created = None;
        let mut key_id = None;
        if !is_v4 {
            created = Some(timestamp(body.read_be_u32()?)?);
            key_id = Some(KeyId::from_bytes(body.read_array::<8>()?));
        }
        let pubkey_algo = PublicKeyAlgorithm::from(body.read_u8()?);
        let digest_algo = HashAlgorithm::from(body.read_u8()?);

        let (hashed, unhashed) = if is_v4 {
            (
                read_subpacket_area(body, "hashed")?,
                read_subpacket_area(body, "unhashed")?,
            )
        } else {
            (None, None)
        };

        if let Some(remaining) = body.remaining() {
            ensure!(remaining >= 5, "signature packet too short");
        }
        let digest_start = body.read_array::<2>()?;

        if is_v4 {
            // pull the required information out of the subpacket areas;
            // their absence is tolerated, not fatal
            match hashed
                .as_deref()
                .map(|b| parse_sig_subpacket(b, SubpacketType::SignatureCreationTime))
            {
                Some(Ok(Some(p))) => created = Some(timestamp(be_u32(p))?),
                _ => warn!("signature packet without timestamp"),
            }
            match unhashed
                .as_deref()
                .map(|b| parse_sig_subpacket(b, SubpacketType::Issuer))
            {
                Some(Ok(Some(p))) => key_id = KeyId::from_slice(&p[..8]).ok(),
                _ => warn!("signature packet without keyid"),
            }
        }

        if list::list_mode() {
            println!(
                ":signature packet: algo {}, keyid {}",
                u8::from(pubkey_algo),
                key_id_display(key_id)
            );
            println!(
                "\tversion {version}, created {}, md5len {md5_len}, sigclass {sig_class:02x}",
                created.map(|t| t.timestamp()).unwrap_or(0)
            );
            println!(
                "\tdigest algo {}, begin of digest {:02x} {:02x}",
                u8::from(digest_algo),
                digest_start[0],
                digest_start[1]
            );
            if is_v4 {
                for (area, is_hashed) in [(&hashed, true), (&unhashed, false)] {
                    if let Some(buf) = area.as_deref() {
                        if let Err(err) = list_sig_subpackets(buf, is_hashed) {
                            warn!("{err}");
                        }
                    }
                }
            }
        }

        let params = if pubkey_algo.is_elgamal() {
            let a = Mpi::try_from_reader(body)?;
            let b = Mpi::try_from_reader(body)?;
            if list::list_mode() {
                println!("\telg a: {}", a.to_list_string());
                println!("\telg b: {}", b.to_list_string());
            }
            SignatureParams::Elgamal { a, b }
        } else if pubkey_algo == PublicKeyAlgorithm::DSA {
            let r = Mpi::try_from_reader(body)?;
            let s = Mpi::try_from_reader(body)?;
            if list::list_mode() {
                println!("\tdsa r: {}", r.to_list_string());
                println!("\tdsa s: {}", s.to_list_string());
            }
            SignatureParams::Dsa { r, s }
        } else if pubkey_algo.is_rsa() {
            let c = Mpi::try_from_reader(body)?;
            if list::list_mode() {
                println!("\trsa integer: {}", c.to_list_string());
            }
            SignatureParams::Rsa { c }
        } else {
            warn!(
                "signature packet with unknown algorithm {}",
                u8::from(pubkey_algo)
            );
            if list::list_mode() {
                println!("\tunknown algorithm {}", u8::from(pubkey_algo));
            }
            SignatureParams::Unknown
        };

        Ok(Signature {
            packet_header,
            version,
            md5_len,
            sig_class,
            created,
            key_id,
            pubkey_algo,
            digest_algo,
            digest_start,
            hashed,
            unhashed,
            params,
        })
    }
}

impl PacketTrait for Signature {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

/// Reads one subpacket area and re-attaches the 2-byte length prefix, so
/// the stored buffer matches the hashed on-wire form.
fn read_subpacket_area<R: BufRead>(
    body: &mut BodyReader<'_, R>,
    what: &str,
) -> Result<Option<Bytes>> {
    let n = body.read_be_u16()?;
    ensure!(
        n <= MAX_SUBPACKET_AREA,
        "signature packet: {what} data too long"
    );
    if n == 0 {
        return Ok(None);
    }
    let mut area = BytesMut::with_capacity(usize::from(n) + 2);
    area.put_u16(n);
    area.extend_from_slice(&body.take_bytes(usize::from(n))?);
    Ok(Some(area.freeze()))
}

fn timestamp(secs: u32) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(i64::from(secs), 0)
        .single()
        .ok_or_else(|| format_err!("invalid timestamp"))
}

fn be_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

fn key_id_display(key_id: Option<KeyId>) -> String {
    match key_id {
        Some(id) => format!("{id:X}"),
        None => "0000000000000000".into(),
    }
}
