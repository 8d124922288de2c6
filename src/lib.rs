#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::style,
    clippy::perf,
    clippy::complexity,
    clippy::correctness,
    clippy::unwrap_used,
    rust_2018_idioms
)]
#![allow(clippy::missing_const_for_fn, clippy::use_self)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

#[macro_use]
pub mod errors;
pub mod list;
pub mod packet;
pub mod parsing_reader;
pub mod source;
pub mod types;

// reexports for easier use
pub use self::errors::{Error, Result};
pub use self::list::set_packet_list_mode;
pub use self::packet::{
    copy_all_packets, copy_some_packets, list_sig_subpackets, parse_packet, parse_sig_subpacket,
    search_packet, skip_some_packets, Packet,
};
pub use self::source::ByteSource;

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
