use std::io::BufRead;

use bytes::Bytes;

use crate::errors::Result;
use crate::list;
use crate::source::BodyReader;
use crate::types::Tag;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// Comment Packet
///
/// Covers both the draft-era comment packet (type 16) and the private
/// comment packet old keyrings carry (type 61); the stored header tells
/// them apart.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Comment {
    packet_header: PacketHeader,
    #[debug("{:?}", String::from_utf8_lossy(data))]
    pub data: Bytes,
}

impl Comment {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        let data = body.rest()?.freeze();

        if list::list_mode() {
            let old = if packet_header.tag() == Tag::OldComment {
                "OpenPGP draft "
            } else {
                ""
            };
            println!(
                ":{old}comment packet: \"{}\"",
                list::escape_to_string(&data)
            );
        }

        Ok(Comment {
            packet_header,
            data,
        })
    }
}

impl PacketTrait for Comment {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
