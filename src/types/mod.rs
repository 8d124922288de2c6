mod algorithm;
mod key_id;
mod mpi;
mod packet;
mod s2k;

pub use self::algorithm::{
    CompressionAlgorithm, HashAlgorithm, PublicKeyAlgorithm, SymmetricKeyAlgorithm,
};
pub use self::key_id::KeyId;
pub use self::mpi::Mpi;
pub use self::packet::{PacketHeaderVersion, PacketLength, Tag};
pub use self::s2k::{S2kMode, StringToKey};
