use std::io::BufRead;

use bytes::Bytes;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::{S2kMode, StringToKey, SymmetricKeyAlgorithm};

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Symmetric-Key Encrypted Session Key Packet
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct SymKeyEncryptedSessionKey {
    packet_header: PacketHeader,
    pub version: u8,
    pub cipher: SymmetricKeyAlgorithm,
    pub s2k: StringToKey,
    /// The wrapped session key; empty when the key is derived directly from
    /// the passphrase.
    #[debug("{}", hex::encode(session_key))]
    pub session_key: Bytes,
}

impl SymKeyEncryptedSessionKey {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        ensure!(
            body.remaining().unwrap_or(0) >= 4,
            "symkey enc packet too short"
        );
        let version = body.read_u8()?;
        ensure!(version == 4, "symkey enc packet with unknown version {version}");
        // the session key length has to fit in a byte later on
        if let Some(remaining) = body.remaining() {
            ensure!(remaining <= 200, "symkey enc packet too large");
        }

        let cipher = SymmetricKeyAlgorithm::from(body.read_u8()?);
        let s2k = StringToKey::try_from_reader(body)?;
        let session_key = body.rest()?.freeze();

        if list::list_mode() {
            println!(
                ":symkey enc packet: version {version}, cipher {}, s2k {}, hash {}",
                u8::from(cipher),
                u8::from(s2k.mode),
                u8::from(s2k.hash)
            );
            if let Some(salt) = &s2k.salt {
                match (s2k.mode, s2k.count) {
                    (S2kMode::IteratedSalted, Some(count)) => {
                        println!("\tsalt {}, count {count}", hex::encode(salt));
                    }
                    _ => println!("\tsalt {}", hex::encode(salt)),
                }
            }
        }

        Ok(SymKeyEncryptedSessionKey {
            packet_header,
            version,
            cipher,
            s2k,
            session_key,
        })
    }
}

impl PacketTrait for SymKeyEncryptedSessionKey {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
