use std::io::BufRead;

use bytes::Bytes;

use crate::errors::Result;
use crate::list;
use crate::parsing_reader::BufReadParsing;
use crate::source::BodyReader;

/// Number of bits we accept when reading MPIs.
/// The value is the same as gnupg's.
const MAX_EXTERN_MPI_BITS: u16 = 16384;

/// A multi-precision integer as read off the wire: the declared bit count
/// plus the magnitude bytes, kept verbatim. Secret-key material arrives
/// still encrypted, so the bytes are opaque and never normalized.
#[derive(Default, Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Mpi {
    bits: u16,
    #[debug("{}", hex::encode(bytes))]
    bytes: Bytes,
}

impl Mpi {
    /// Reads one length-prefixed MPI from the packet body. The body's byte
    /// budget bounds the read; an integer that claims to extend past the
    /// packet is rejected.
    pub fn try_from_reader<R: BufRead>(body: &mut BodyReader<'_, R>) -> Result<Self> {
        let bits = body.read_be_u16()?;
        ensure!(bits <= MAX_EXTERN_MPI_BITS, "mpi too large ({bits} bits)");

        let len = (usize::from(bits) + 7) >> 3;
        if let Some(remaining) = body.remaining() {
            ensure!(
                len as u32 <= remaining,
                "mpi of {len} bytes spans beyond the packet body ({remaining} bytes left)"
            );
        }
        let bytes = body.take_bytes(len)?.freeze();

        Ok(Mpi { bits, bytes })
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// How the listing renders an MPI: a placeholder normally, the full
    /// value when the mpi debug flag is set.
    pub(crate) fn to_list_string(&self) -> String {
        if list::mpi_print_mode() {
            hex::encode(&self.bytes)
        } else {
            format!("[{} bits]", self.bits)
        }
    }
}

impl AsRef<[u8]> for Mpi {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}
