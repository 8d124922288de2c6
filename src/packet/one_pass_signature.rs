use std::io::BufRead;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;
use crate::types::{HashAlgorithm, KeyId, PublicKeyAlgorithm};

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// One-Pass Signature Packet
///
/// A fixed 13 byte body announcing the signature that follows the signed
/// data, so a verifier can hash in a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSignature {
    packet_header: PacketHeader,
    pub version: u8,
    pub sig_class: u8,
    pub digest_algo: HashAlgorithm,
    pub pubkey_algo: PublicKeyAlgorithm,
    pub key_id: KeyId,
    /// Zero when further one-pass blocks are nested around this one.
    pub last: u8,
}

impl OnePassSignature {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        ensure!(
            body.remaining().unwrap_or(0) >= 13,
            "one-pass signature packet too short"
        );
        let version = body.read_u8()?;
        ensure!(
            version == 3,
            "one-pass signature with unknown version {version}"
        );
        let sig_class = body.read_u8()?;
        let digest_algo = HashAlgorithm::from(body.read_u8()?);
        let pubkey_algo = PublicKeyAlgorithm::from(body.read_u8()?);
        let key_id = KeyId::from_bytes(body.read_array::<8>()?);
        let last = body.read_u8()?;

        if list::list_mode() {
            println!(":onepass_sig packet: keyid {key_id:X}");
            println!(
                "\tversion {version}, sigclass {sig_class:02x}, digest {}, pubkey {}, last={last}",
                u8::from(digest_algo),
                u8::from(pubkey_algo)
            );
        }

        Ok(OnePassSignature {
            packet_header,
            version,
            sig_class,
            digest_algo,
            pubkey_algo,
            key_id,
            last,
        })
    }
}

impl PacketTrait for OnePassSignature {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
