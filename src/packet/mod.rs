//! Packet framing, the per-type payload decoders and the dispatcher.

mod comment;
mod compressed_data;
mod header;
mod key;
mod literal_data;
mod many;
mod one_pass_signature;
mod packet_sum;
mod public_key_encrypted_session_key;
mod signature;
mod subpacket;
mod sym_encrypted_data;
mod sym_key_encrypted_session_key;
mod trust;
mod user_id;

pub use self::comment::Comment;
pub use self::compressed_data::CompressedData;
pub use self::header::PacketHeader;
pub use self::key::{KeyProtection, PublicKey, PublicParams, SecretKey, SecretParams};
pub use self::literal_data::{DataMode, LiteralData};
pub use self::many::{
    copy_all_packets, copy_some_packets, parse_packet, search_packet, skip_some_packets,
};
pub use self::one_pass_signature::OnePassSignature;
pub use self::packet_sum::{Packet, PacketTrait};
pub use self::public_key_encrypted_session_key::{PublicKeyEncryptedSessionKey, SessionKeyParams};
pub use self::signature::{Signature, SignatureParams};
pub use self::subpacket::{list_sig_subpackets, parse_sig_subpacket, SubpacketType};
pub use self::sym_encrypted_data::SymEncryptedData;
pub use self::sym_key_encrypted_session_key::SymKeyEncryptedSessionKey;
pub use self::trust::Trust;
pub use self::user_id::UserId;
