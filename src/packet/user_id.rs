use std::io::BufRead;

use bytes::Bytes;

use crate::errors::Result;
use crate::list;
use crate::source::BodyReader;

use super::header::PacketHeader;
use super::packet_sum::PacketTrait;

/// User ID Packet
///
/// The body is the identity string as raw bytes; it is usually UTF-8 but
/// nothing enforces that on the wire.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct UserId {
    packet_header: PacketHeader,
    #[debug("{:?}", String::from_utf8_lossy(id))]
    pub id: Bytes,
}

impl UserId {
    pub(crate) fn from_body<R: BufRead>(
        packet_header: PacketHeader,
        body: &mut BodyReader<'_, R>,
    ) -> Result<Self> {
        let id = body.rest()?.freeze();

        if list::list_mode() {
            println!(":user id packet: \"{}\"", list::escape_to_string(&id));
        }

        Ok(UserId { packet_header, id })
    }
}

impl PacketTrait for UserId {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}
