use std::io::BufRead;

use log::warn;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::{KeyId, Mpi, PublicKeyAlgorithm};

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Public-Key Encrypted Session Key Packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEncryptedSessionKey {
    packet_header: PacketHeader,
    pub version: u8,
    pub key_id: KeyId,
    pub algorithm: PublicKeyAlgorithm,
    pub params: SessionKeyParams,
}

/// The algorithm-specific integers wrapping the session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKeyParams {
    Elgamal { a: Mpi, b: Mpi },
    Rsa { c: Mpi },
    /// Unrecognized algorithm; the payload was drained without decoding.
    Unknown,
}

impl PublicKeyEncryptedSessionKey {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        ensure!(
            body.remaining().unwrap_or(0) >= 12,
            "pubkey enc packet too short"
        );
        let version = body.read_u8()?;
        ensure!(
            version == 2 || version == 3,
            "pubkey enc packet with unknown version {version}"
        );
        let key_id = KeyId::from_bytes(body.read_array::<8>()?);
        let algorithm = PublicKeyAlgorithm::from(body.read_u8()?);

        if list::list_mode() {
            println!(
                ":pubkey enc packet: version {version}, algo {}, keyid {key_id:X}",
                u8::from(algorithm)
            );
        }

        let params = if algorithm.is_elgamal() {
            let a = Mpi::try_from_reader(body)?;
            let b = Mpi::try_from_reader(body)?;
            if list::list_mode() {
                println!("\telg a: {}", a.to_list_string());
                println!("\telg b: {}", b.to_list_string());
            }
            SessionKeyParams::Elgamal { a, b }
        } else if algorithm.is_rsa() {
            let c = Mpi::try_from_reader(body)?;
            if list::list_mode() {
                println!("\trsa integer: {}", c.to_list_string());
            }
            SessionKeyParams::Rsa { c }
        } else {
            warn!(
                "pubkey enc packet with unknown algorithm {}",
                u8::from(algorithm)
            );
            if list::list_mode() {
                println!("\tunknown algorithm {}", u8::from(algorithm));
            }
            SessionKeyParams::Unknown
        };

        Ok(PublicKeyEncryptedSessionKey {
            packet_header,
            version,
            key_id,
            algorithm,
            params,
        })
    }
}

impl PacketTrait for PublicKeyEncryptedSessionKey {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
