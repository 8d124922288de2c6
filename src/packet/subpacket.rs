//! The self-describing subpacket stream inside v4 signatures.
//!
//! A subpacket area is a 2-byte big-endian total length followed by
//! concatenated subpackets, each of them a variable-length size (one, two
//! or five octets), a type byte (high bit marks the subpacket critical) and
//! the payload.

use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;

/// Signature subpacket type codes.
/// Ref: <https://tools.ietf.org/html/rfc2440#section-5.2.3.1>
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SubpacketType {
    SignatureCreationTime = 2,
    SignatureExpirationTime = 3,
    ExportableCertification = 4,
    TrustSignature = 5,
    RegularExpression = 6,
    Revocable = 7,
    KeyExpirationTime = 9,
    AdditionalRecipientRequest = 10,
    PreferredSymmetricAlgorithms = 11,
    RevocationKey = 12,
    Issuer = 16,
    NotationData = 20,
    PreferredHashAlgorithms = 21,
    PreferredCompressionAlgorithms = 22,
    KeyServerPreferences = 23,
    PreferredKeyServer = 24,
    PrimaryUserId = 25,
    PolicyUrl = 26,
    KeyFlags = 27,
    SignersUserId = 28,

    #[num_enum(catch_all)]
    Other(u8),
}

impl SubpacketType {
    fn name(self) -> &'static str {
        match self {
            Self::SignatureCreationTime => "signature creation time",
            Self::SignatureExpirationTime => "signature expiration time",
            Self::ExportableCertification => "exportable",
            Self::TrustSignature => "trust signature",
            Self::RegularExpression => "regular expression",
            Self::Revocable => "revocable",
            Self::KeyExpirationTime => "key expiration time",
            Self::AdditionalRecipientRequest => "additional recipient request",
            Self::PreferredSymmetricAlgorithms => "preferred symmetric algorithms",
            Self::RevocationKey => "revocation key",
            Self::Issuer => "issuer key ID",
            Self::NotationData => "notation data",
            Self::PreferredHashAlgorithms => "preferred hash algorithms",
            Self::PreferredCompressionAlgorithms => "preferred compression algorithms",
            Self::KeyServerPreferences => "key server preferences",
            Self::PreferredKeyServer => "preferred key server",
            Self::PrimaryUserId => "primary user id",
            Self::PolicyUrl => "policy URL",
            Self::KeyFlags => "key flags",
            Self::SignersUserId => "signer's user id",
            Self::Other(_) => "?",
        }
    }

    /// Payload sizes enforced during targeted extraction.
    fn min_payload(self) -> usize {
        match self {
            Self::SignatureCreationTime => 4,
            Self::Issuer => 8,
            _ => 0,
        }
    }
}

pub(crate) struct SubpacketRef<'a> {
    pub typ: SubpacketType,
    #[allow(dead_code)]
    pub critical: bool,
    /// Size as encoded, which counts the type byte.
    pub encoded_len: usize,
    pub payload: &'a [u8],
}

/// Walks a length-prefixed subpacket area.
pub(crate) struct Subpackets<'a> {
    rest: &'a [u8],
}

impl<'a> Subpackets<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Result<Self> {
        ensure!(buf.len() >= 2, "subpacket area shorter than its length prefix");
        let declared = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
        ensure!(
            buf.len() - 2 >= declared,
            "buffer shorter than subpacket area"
        );
        Ok(Subpackets {
            rest: &buf[2..2 + declared],
        })
    }
}

impl<'a> Iterator for Subpackets<'a> {
    type Item = Result<SubpacketRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let mut r = self.rest;
        let first = r[0];
        r = &r[1..];
        let len = match first {
            0..=191 => usize::from(first),
            192..=254 => {
                let Some(&second) = r.first() else {
                    self.rest = &[];
                    return Some(Err(format_err!("buffer shorter than subpacket")));
                };
                r = &r[1..];
                ((usize::from(first) - 192) << 8) + usize::from(second) + 192
            }
            255 => {
                if r.len() < 4 {
                    self.rest = &[];
                    return Some(Err(format_err!("buffer shorter than subpacket")));
                }
                let len = u32::from_be_bytes([r[0], r[1], r[2], r[3]]);
                r = &r[4..];
                len as usize
            }
        };

        if len == 0 || r.len() < len {
            self.rest = &[];
            return Some(Err(format_err!("buffer shorter than subpacket")));
        }

        let typ_byte = r[0];
        let sp = SubpacketRef {
            typ: SubpacketType::from(typ_byte & 0x7f),
            critical: typ_byte & 0x80 != 0,
            encoded_len: len,
            payload: &r[1..len],
        };
        self.rest = &r[len..];
        Some(Ok(sp))
    }
}

/// Finds the first subpacket of the requested type in `buf` (a 2-byte
/// length-prefixed area) and returns its payload. Known types with a
/// required minimum payload size are checked; a smaller payload is an
/// error. `Ok(None)` means the area holds no such subpacket.
pub fn parse_sig_subpacket(buf: &[u8], want: SubpacketType) -> Result<Option<&[u8]>> {
    for sp in Subpackets::new(buf)? {
        let sp = sp?;
        if sp.typ == want {
            ensure!(
                sp.payload.len() >= want.min_payload(),
                "subpacket of type {} too short",
                u8::from(want)
            );
            return Ok(Some(sp.payload));
        }
    }
    Ok(None)
}

/// Prints one line per subpacket in `buf`, with the type name spelled out.
pub fn list_sig_subpackets(buf: &[u8], hashed: bool) -> Result<()> {
    let prefix = if hashed { "hashed " } else { "" };
    for sp in Subpackets::new(buf)? {
        let sp = sp?;
        println!(
            "\t{prefix}subpacket {} of length {} ({})",
            u8::from(sp.typ),
            sp.encoded_len,
            sp.typ.name()
        );
    }
    Ok(())
}
