use std::fmt;

use crate::types::{PacketLength, Tag};

use super::comment::Comment;
use super::compressed_data::CompressedData;
use super::header::PacketHeader;
use super::key::{PublicKey, SecretKey};
use super::literal_data::LiteralData;
use super::one_pass_signature::OnePassSignature;
use super::public_key_encrypted_session_key::PublicKeyEncryptedSessionKey;
use super::signature::Signature;
use super::sym_encrypted_data::SymEncryptedData;
use super::sym_key_encrypted_session_key::SymKeyEncryptedSessionKey;
use super::trust::Trust;
use super::user_id::UserId;

/// Shared access to the per-packet header metadata.
pub trait PacketTrait {
    fn packet_header(&self) -> &PacketHeader;

    fn tag(&self) -> Tag {
        self.packet_header().tag()
    }

    fn packet_length(&self) -> PacketLength {
        self.packet_header().packet_length()
    }
}

/// One decoded packet.
///
/// The streaming variants (literal, compressed, encrypted data) keep the
/// source borrowed through their body reader; everything else is owned.
/// Public and secret subkeys reuse the primary key records, the stored
/// header keeps them apart.
pub enum Packet<'a, R> {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
    OnePassSignature(OnePassSignature),
    SecretKey(SecretKey),
    PublicKey(PublicKey),
    SecretSubkey(SecretKey),
    PublicSubkey(PublicKey),
    CompressedData(CompressedData<'a, R>),
    SymEncryptedData(SymEncryptedData<'a, R>),
    LiteralData(LiteralData<'a, R>),
    Trust(Trust),
    UserId(UserId),
    Comment(Comment),
}

impl<R> Packet<'_, R> {
    pub fn packet_header(&self) -> &PacketHeader {
        match self {
            Self::PublicKeyEncryptedSessionKey(p) => p.packet_header(),
            Self::Signature(p) => p.packet_header(),
            Self::SymKeyEncryptedSessionKey(p) => p.packet_header(),
            Self::OnePassSignature(p) => p.packet_header(),
            Self::SecretKey(p) => p.packet_header(),
            Self::PublicKey(p) => p.packet_header(),
            Self::SecretSubkey(p) => p.packet_header(),
            Self::PublicSubkey(p) => p.packet_header(),
            Self::CompressedData(p) => p.packet_header(),
            Self::SymEncryptedData(p) => p.packet_header(),
            Self::LiteralData(p) => p.packet_header(),
            Self::Trust(p) => p.packet_header(),
            Self::UserId(p) => p.packet_header(),
            Self::Comment(p) => p.packet_header(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.packet_header().tag()
    }
}

impl<R> fmt::Debug for Packet<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicKeyEncryptedSessionKey(p) => {
                f.debug_tuple("PublicKeyEncryptedSessionKey").field(p).finish()
            }
            Self::Signature(p) => f.debug_tuple("Signature").field(p).finish(),
            Self::SymKeyEncryptedSessionKey(p) => {
                f.debug_tuple("SymKeyEncryptedSessionKey").field(p).finish()
            }
            Self::OnePassSignature(p) => f.debug_tuple("OnePassSignature").field(p).finish(),
            Self::SecretKey(p) => f.debug_tuple("SecretKey").field(p).finish(),
            Self::PublicKey(p) => f.debug_tuple("PublicKey").field(p).finish(),
            Self::SecretSubkey(p) => f.debug_tuple("SecretSubkey").field(p).finish(),
            Self::PublicSubkey(p) => f.debug_tuple("PublicSubkey").field(p).finish(),
            Self::CompressedData(p) => f.debug_tuple("CompressedData").field(p).finish(),
            Self::SymEncryptedData(p) => f.debug_tuple("SymEncryptedData").field(p).finish(),
            Self::LiteralData(p) => f.debug_tuple("LiteralData").field(p).finish(),
            Self::Trust(p) => f.debug_tuple("Trust").field(p).finish(),
            Self::UserId(p) => f.debug_tuple("UserId").field(p).finish(),
            Self::Comment(p) => f.debug_tuple("Comment").field(p).finish(),
        }
    }
}
