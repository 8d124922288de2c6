//! Process-wide list mode.
//!
//! When enabled, every parsed packet prints a human readable block of
//! `:packet:` lines to stdout, interleaved with parsing in stream order.
//! Downstream tools scan this output, so the line formats are stable.

use std::sync::atomic::{AtomicBool, Ordering};

static LIST_MODE: AtomicBool = AtomicBool::new(false);
static MPI_PRINT_MODE: AtomicBool = AtomicBool::new(false);

/// Sets both list-mode flags and returns the previous list flag, so a tool
/// can restore the old state afterwards. `verbose_mpis` selects full hex
/// dumps over `[N bits]` placeholders when printing MPIs.
pub fn set_packet_list_mode(list: bool, verbose_mpis: bool) -> bool {
    MPI_PRINT_MODE.store(verbose_mpis, Ordering::Relaxed);
    LIST_MODE.swap(list, Ordering::Relaxed)
}

pub(crate) fn list_mode() -> bool {
    LIST_MODE.load(Ordering::Relaxed)
}

pub(crate) fn mpi_print_mode() -> bool {
    MPI_PRINT_MODE.load(Ordering::Relaxed)
}

/// Renders bytes the way the listing prints strings: printable characters
/// in `' '..='z'` stay as they are, everything else becomes `\xNN`.
pub(crate) fn escape_to_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (b' '..=b'z').contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out
}

/// Incremental hex dump: bytes in groups of 8, a fresh line with a 4-digit
/// decimal offset every 24 bytes.
pub(crate) struct HexDump {
    count: usize,
}

impl HexDump {
    pub(crate) fn new() -> Self {
        HexDump { count: 0 }
    }

    pub(crate) fn push(&mut self, byte: Option<u8>) {
        if self.count != 0 && self.count % 8 == 0 {
            if self.count % 24 == 0 {
                print!("\n{:4}:", self.count);
            } else {
                print!(" ");
            }
        }
        match byte {
            Some(b) => print!(" {b:02x}"),
            None => print!(" EOF"),
        }
        self.count += 1;
    }
}
