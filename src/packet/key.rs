//! Public and secret key packets, primary and subkey alike.
//!
//! This is the widest decoder in the crate: it covers the cross product of
//! {public, secret} x {primary, subkey} x {Elgamal, DSA, RSA} x {v2/v3, v4}
//! and, for secret keys, the three protection generations (unprotected,
//! legacy cipher-byte protection, full S2K protection).

use std::io::BufRead;

use chrono::{DateTime, TimeZone, Utc};
use log::warn;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::{
    HashAlgorithm, Mpi, PublicKeyAlgorithm, StringToKey, S2kMode, SymmetricKeyAlgorithm, Tag,
};

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Public-Key and Public-Subkey Packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    packet_header: PacketHeader,
    pub version: u8,
    pub created: DateTime<Utc>,
    /// Expiry in days; always 0 for v4 keys, which moved expiry into
    /// signature subpackets.
    pub valid_days: u16,
    pub algorithm: PublicKeyAlgorithm,
    pub params: PublicParams,
}

/// Secret-Key and Secret-Subkey Packet
///
/// The public half is carried by composition; the secret half stays in
/// whatever protected form it had on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKey {
    pub details: PublicKey,
    pub protection: Option<KeyProtection>,
    pub secret_params: SecretParams,
    pub checksum: Option<u16>,
}

/// Algorithm-specific public key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicParams {
    Elgamal { p: Mpi, g: Mpi, y: Mpi },
    Dsa { p: Mpi, q: Mpi, g: Mpi, y: Mpi },
    Rsa { n: Mpi, e: Mpi },
    /// Unrecognized algorithm; the payload was drained without decoding.
    Unknown,
}

/// Algorithm-specific secret key material. When the key is protected these
/// MPIs are still ciphertext and only framing-valid, not meaningful
/// integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretParams {
    Elgamal { x: Mpi },
    Dsa { x: Mpi },
    Rsa { d: Mpi, p: Mpi, q: Mpi, u: Mpi },
    Unknown,
}

/// Passphrase protection of the secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProtection {
    pub cipher: SymmetricKeyAlgorithm,
    pub s2k: StringToKey,
    /// `None` only for legacy RSA keys whose cipher is not Blowfish160;
    /// the early RSA code path never stored the IV for those.
    pub iv: Option<[u8; 8]>,
}

pub(crate) enum ParsedKey {
    Public(PublicKey),
    Secret(SecretKey),
}

/// Decodes a key packet of any of the four tags. Returns `Ok(None)` for
/// the draft-era comment packets that very old streams stored in subkey
/// position; those are printed (in list mode) and skipped.
pub(crate) fn parse_key<R: BufRead>(
    packet_header: PacketHeader,
    body: &mut BodyReader<'_, R>,
) -> Result<Option<ParsedKey>> {
    let tag = packet_header.tag();
    let version = body.read_u8()?;

    if tag == Tag::PublicSubkey && version == b'#' {
        // early gnupg wrote rfc1991 comment packets here; they all start
        // with a hash character
        if list::list_mode() {
            let rest = body.rest()?;
            println!(
                ":rfc1991 comment packet: \"{}\"",
                list::escape_to_string(&rest)
            );
        }
        return Ok(None);
    }

    ensure!(
        matches!(version, 2 | 3 | 4),
        "key packet with unknown version {version}"
    );
    if let Some(remaining) = body.remaining() {
        ensure!(remaining >= 11, "key packet too short");
    }

    let created = timestamp(body.read_be_u32()?)?;
    let valid_days = if version == 4 { 0 } else { body.read_be_u16()? };
    let algorithm = PublicKeyAlgorithm::from(body.read_u8()?);

    if list::list_mode() {
        let kind = match tag {
            Tag::PublicKey => "public",
            Tag::SecretKey => "secret",
            Tag::PublicSubkey => "public sub",
            Tag::SecretSubkey => "secret sub",
            _ => "??",
        };
        println!(":{kind} key packet:");
        println!(
            "\tversion {version}, algo {}, created {}, valid for {valid_days} days",
            u8::from(algorithm),
            created.timestamp()
        );
    }

    let params = read_public_params(body, algorithm)?;
    let public = PublicKey {
        packet_header,
        version,
        created,
        valid_days,
        algorithm,
        params,
    };

    if matches!(tag, Tag::PublicKey | Tag::PublicSubkey) {
        return Ok(Some(ParsedKey::Public(public)));
    }

    let (protection, secret_params, checksum) = if algorithm.is_elgamal() {
        let protection = read_protection(body, algorithm)?;
        let x = Mpi::try_from_reader(body)?;
        let checksum = body.read_be_u16()?;
        list_secret("x", checksum);
        (protection, SecretParams::Elgamal { x }, Some(checksum))
    } else if algorithm == PublicKeyAlgorithm::DSA {
        let protection = read_protection(body, algorithm)?;
        let x = Mpi::try_from_reader(body)?;
        let checksum = body.read_be_u16()?;
        list_secret("x", checksum);
        (protection, SecretParams::Dsa { x }, Some(checksum))
    } else if algorithm.is_rsa() {
        let protection = read_protection(body, algorithm)?;
        let d = Mpi::try_from_reader(body)?;
        let p = Mpi::try_from_reader(body)?;
        let q = Mpi::try_from_reader(body)?;
        let u = Mpi::try_from_reader(body)?;
        let checksum = body.read_be_u16()?;
        list_secret("d,p,q,u", checksum);
        (
            protection,
            SecretParams::Rsa { d, p, q, u },
            Some(checksum),
        )
    } else {
        (None, SecretParams::Unknown, None)
    };

    Ok(Some(ParsedKey::Secret(SecretKey {
        details: public,
        protection,
        secret_params,
        checksum,
    })))
}

fn read_public_params<R: BufRead>(
    body: &mut BodyReader<'_, R>,
    algorithm: PublicKeyAlgorithm,
) -> Result<PublicParams> {
    if algorithm.is_elgamal() {
        let p = Mpi::try_from_reader(body)?;
        let g = Mpi::try_from_reader(body)?;
        let y = Mpi::try_from_reader(body)?;
        if list::list_mode() {
            println!("\telg p: {}", p.to_list_string());
            println!("\telg g: {}", g.to_list_string());
            println!("\telg y: {}", y.to_list_string());
        }
        Ok(PublicParams::Elgamal { p, g, y })
    } else if algorithm == PublicKeyAlgorithm::DSA {
        let p = Mpi::try_from_reader(body)?;
        let q = Mpi::try_from_reader(body)?;
        let g = Mpi::try_from_reader(body)?;
        let y = Mpi::try_from_reader(body)?;
        if list::list_mode() {
            println!("\tdsa p: {}", p.to_list_string());
            println!("\tdsa q: {}", q.to_list_string());
            println!("\tdsa g: {}", g.to_list_string());
            println!("\tdsa y: {}", y.to_list_string());
        }
        Ok(PublicParams::Dsa { p, q, g, y })
    } else if algorithm.is_rsa() {
        let n = Mpi::try_from_reader(body)?;
        let e = Mpi::try_from_reader(body)?;
        if list::list_mode() {
            println!("\tpublic modulus  n:  {}", n.to_list_string());
            println!("\tpublic exponent e: {}", e.to_list_string());
        }
        Ok(PublicParams::Rsa { n, e })
    } else {
        warn!("key packet with unknown algorithm {}", u8::from(algorithm));
        if list::list_mode() {
            println!("\tunknown algorithm {}", u8::from(algorithm));
        }
        Ok(PublicParams::Unknown)
    }
}

/// Reads the protection byte and whatever it implies. Three generations:
/// 0 is unprotected, 255 introduces a full cipher + S2K specifier, and any
/// other value is itself the cipher id of the legacy scheme.
fn read_protection<R: BufRead>(
    body: &mut BodyReader<'_, R>,
    algorithm: PublicKeyAlgorithm,
) -> Result<Option<KeyProtection>> {
    let first = body.read_u8()?;
    if first == 0 {
        return Ok(None);
    }

    let (cipher, s2k) = if first == 255 {
        if let Some(remaining) = body.remaining() {
            ensure!(remaining >= 3, "protected key packet too short");
        }
        let cipher = SymmetricKeyAlgorithm::from(body.read_u8()?);
        let s2k = StringToKey::try_from_reader(body)?;
        if list::list_mode() {
            let mode = match s2k.mode {
                S2kMode::Simple => "simple",
                S2kMode::Salted => "salted",
                S2kMode::IteratedSalted => "iter+salt",
                S2kMode::Other(_) => "unknown",
            };
            print!(
                "\t{mode} S2K, algo: {}, hash: {}",
                u8::from(cipher),
                u8::from(s2k.hash)
            );
            if let Some(salt) = &s2k.salt {
                print!(", salt: {}", hex::encode(salt));
            }
            println!();
        }
        (cipher, s2k)
    } else {
        let cipher = SymmetricKeyAlgorithm::from(first);
        if list::list_mode() {
            println!("\tprotect algo: {}", u8::from(cipher));
        }
        // old protection format without an S2K; fake the one those
        // implementations assumed
        let hash = if algorithm.is_elgamal() && cipher == SymmetricKeyAlgorithm::Blowfish160 {
            HashAlgorithm::RIPEMD160
        } else {
            HashAlgorithm::MD5
        };
        (cipher, StringToKey::legacy(hash))
    };

    if let Some(remaining) = body.remaining() {
        ensure!(remaining >= 8, "protected key packet is missing its IV");
    }
    let iv = body.read_array::<8>()?;
    if list::list_mode() {
        print!("\tprotect IV: ");
        for b in &iv {
            print!(" {b:02x}");
        }
        println!();
    }

    // the early rsa code only retained the IV for its private blowfish
    // variant
    let iv = if algorithm.is_rsa() && cipher != SymmetricKeyAlgorithm::Blowfish160 {
        None
    } else {
        Some(iv)
    };

    Ok(Some(KeyProtection { cipher, s2k, iv }))
}

fn list_secret(values: &str, checksum: u16) {
    if list::list_mode() {
        if values.len() == 1 {
            println!("\t[secret value {values} is not shown]");
        } else {
            println!("\t[secret values {values} are not shown]");
        }
        println!("\tchecksum: {checksum:04x}");
    }
}

fn timestamp(secs: u32) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(i64::from(secs), 0)
        .single()
        .ok_or_else(|| format_err!("invalid timestamp"))
}

impl PacketTrait for PublicKey {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

impl PacketTrait for SecretKey {
    fn packet_header(&self) -> &PacketHeader {
        self.details.packet_header()
    }
}
