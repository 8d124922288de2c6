/// Represents the packet length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketLength {
    /// Definite body length in bytes.
    Fixed(u32),
    /// Old format body without length bytes; it runs to the end of input.
    Indeterminate,
    /// New format partial body; the value is the first chunk's size.
    Partial(u32),
}

impl PacketLength {
    /// The definite length, if there is one. Indeterminate and partial
    /// bodies report `None`; their extent comes from the source's mode.
    pub fn maybe_len(&self) -> Option<u32> {
        match self {
            Self::Fixed(len) => Some(*len),
            Self::Indeterminate | Self::Partial(_) => None,
        }
    }
}

/// Packet type codes of RFC 1991 / RFC 2440 era streams.
///
/// 16 is the comment packet of the early OpenPGP drafts; 61 is the private
/// comment packet old gnupg versions wrote into keyrings.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum Tag {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey,
    /// Signature Packet
    Signature,
    /// Symmetric-Key Encrypted Session Key Packet
    SymKeyEncryptedSessionKey,
    /// One-Pass Signature Packet
    OnePassSignature,
    /// Secret-Key Packet
    SecretKey,
    /// Public-Key Packet
    PublicKey,
    /// Secret-Subkey Packet
    SecretSubkey,
    /// Compressed Data Packet
    CompressedData,
    /// Symmetrically Encrypted Data Packet
    SymEncryptedData,
    /// Marker Packet
    Marker,
    /// Literal Data Packet
    LiteralData,
    /// Ring Trust Packet
    Trust,
    /// User ID Packet
    UserId,
    /// Public-Subkey Packet
    PublicSubkey,
    /// Comment Packet from the early OpenPGP drafts
    OldComment,
    /// Private Comment Packet
    Comment,

    /// Everything else, including 0 ("deleted")
    Other(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::PublicKeyEncryptedSessionKey,
            2 => Self::Signature,
            3 => Self::SymKeyEncryptedSessionKey,
            4 => Self::OnePassSignature,
            5 => Self::SecretKey,
            6 => Self::PublicKey,
            7 => Self::SecretSubkey,
            8 => Self::CompressedData,
            9 => Self::SymEncryptedData,
            10 => Self::Marker,
            11 => Self::LiteralData,
            12 => Self::Trust,
            13 => Self::UserId,
            14 => Self::PublicSubkey,
            16 => Self::OldComment,
            61 => Self::Comment,
            o => Self::Other(o),
        }
    }
}

impl From<Tag> for u8 {
    fn from(value: Tag) -> Self {
        match value {
            Tag::PublicKeyEncryptedSessionKey => 1,
            Tag::Signature => 2,
            Tag::SymKeyEncryptedSessionKey => 3,
            Tag::OnePassSignature => 4,
            Tag::SecretKey => 5,
            Tag::PublicKey => 6,
            Tag::SecretSubkey => 7,
            Tag::CompressedData => 8,
            Tag::SymEncryptedData => 9,
            Tag::Marker => 10,
            Tag::LiteralData => 11,
            Tag::Trust => 12,
            Tag::UserId => 13,
            Tag::PublicSubkey => 14,
            Tag::OldComment => 16,
            Tag::Comment => 61,
            Tag::Other(o) => o,
        }
    }
}

/// The two framing conventions, selected by bit 6 of the control byte.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketHeaderVersion {
    /// RFC 1991 style headers with the two-bit length-type field.
    Old,
    /// New style headers with variable-length and partial encodings.
    New,
}
