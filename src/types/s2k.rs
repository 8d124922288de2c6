use std::io::BufRead;

use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;

use super::algorithm::HashAlgorithm;

/// String-to-key specifier in its RFC 1991 / RFC 2440 draft form: the mode
/// byte is 0, 1 or 4 and the iteration count is a raw 32-bit value, not the
/// coded single octet of later revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToKey {
    pub mode: S2kMode,
    pub hash: HashAlgorithm,
    pub salt: Option<[u8; 8]>,
    pub count: Option<u32>,
}

/// S2K modes of the era. 2 and 3 were never assigned.
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum S2kMode {
    Simple = 0,
    Salted = 1,
    IteratedSalted = 4,

    #[num_enum(catch_all)]
    Other(u8),
}

impl StringToKey {
    /// Reads mode, hash and the mode's parameters. Checks the byte budget
    /// up front so a short packet fails before any partial field reads.
    pub(crate) fn try_from_reader<R: BufRead>(body: &mut BodyReader<'_, R>) -> Result<Self> {
        let mode = S2kMode::from(body.read_u8()?);
        let hash = HashAlgorithm::from(body.read_u8()?);

        let needed = match mode {
            S2kMode::Simple => 0,
            S2kMode::Salted => 8,
            S2kMode::IteratedSalted => 12,
            S2kMode::Other(m) => bail!("unknown S2K mode {m}"),
        };
        if let Some(remaining) = body.remaining() {
            ensure!(remaining >= needed, "packet with S2K mode {mode:?} too short");
        }

        let salt = match mode {
            S2kMode::Salted | S2kMode::IteratedSalted => Some(body.read_array::<8>()?),
            _ => None,
        };
        let count = match mode {
            S2kMode::IteratedSalted => Some(body.read_be_u32()?),
            _ => None,
        };

        Ok(StringToKey {
            mode,
            hash,
            salt,
            count,
        })
    }

    /// The fabricated specifier for secret keys that predate S2K encoding.
    pub(crate) fn legacy(hash: HashAlgorithm) -> Self {
        StringToKey {
            mode: S2kMode::Simple,
            hash,
            salt: None,
            count: None,
        }
    }
}
