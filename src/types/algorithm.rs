//! Algorithm identifiers as they appear on the wire. No algorithm is ever
//! executed here; the ids are carried through so callers can dispatch.

use num_enum::{FromPrimitive, IntoPrimitive};

/// Public-key algorithm ids.
/// Ref: <https://tools.ietf.org/html/rfc2440#section-9.1>
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    RSA = 1,
    /// RSA (Encrypt-Only)
    RSAEncrypt = 2,
    /// RSA (Sign-Only)
    RSASign = 3,
    /// Elgamal (Encrypt-Only)
    ElgamalEncrypt = 16,
    /// DSA (Digital Signature Algorithm)
    DSA = 17,
    /// Elgamal (Encrypt and Sign)
    Elgamal = 20,

    #[num_enum(catch_all)]
    Other(u8),
}

impl PublicKeyAlgorithm {
    pub fn is_rsa(self) -> bool {
        matches!(self, Self::RSA | Self::RSAEncrypt | Self::RSASign)
    }

    pub fn is_elgamal(self) -> bool {
        matches!(self, Self::ElgamalEncrypt | Self::Elgamal)
    }
}

/// Hash algorithm ids, including the pre-OpenPGP Tiger assignment.
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum HashAlgorithm {
    None = 0,
    MD5 = 1,
    SHA1 = 2,
    RIPEMD160 = 3,
    Tiger = 6,

    #[num_enum(catch_all)]
    Other(u8),
}

/// Symmetric cipher ids. Ids 4 to 6 are the pre-OpenPGP assignments old
/// streams still carry; Blowfish160 matters for legacy secret-key
/// protection.
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SymmetricKeyAlgorithm {
    Plaintext = 0,
    IDEA = 1,
    TripleDES = 2,
    CAST5 = 3,
    Blowfish160 = 4,
    SaferSK128 = 5,
    DESSK = 6,
    Blowfish = 20,

    #[num_enum(catch_all)]
    Other(u8),
}

/// Compression algorithm ids.
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CompressionAlgorithm {
    Uncompressed = 0,
    ZIP = 1,
    ZLIB = 2,

    #[num_enum(catch_all)]
    Other(u8),
}
