use std::io::BufRead;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Ring Trust Packet
///
/// A single flag byte of keyring-local bookkeeping. These packets never
/// travel between implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trust {
    packet_header: PacketHeader,
    pub value: u8,
}

impl Trust {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        let value = body.read_u8()?;

        if list::list_mode() {
            println!(":trust packet: flag={value:02x}");
        }

        Ok(Trust {
            packet_header,
            value,
        })
    }
}

impl PacketTrait for Trust {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
