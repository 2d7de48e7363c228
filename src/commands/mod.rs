//! CLI command implementations
//!
//! Every command works on an [`St25dv`] driver over a boxed bus, so the
//! same code runs against the emulator and real hardware.

pub mod info;
mod list;
pub mod mailbox;
pub mod memory;
pub mod security;
pub mod zones;

pub use list::list_buses;

use crate::buses::BoxedBus;
use st25dv_core::St25dv;

/// Driver type used by all commands
pub type Tag = St25dv<BoxedBus>;

/// Result type used by all commands
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Print `data` as a classic 16-byte-per-line hex dump starting at `base`
pub fn hex_dump(base: usize, data: &[u8]) {
    for line in format_hex_dump(base, data) {
        println!("{}", line);
    }
}

fn format_hex_dump(base: usize, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("{:04X}: {:<47}  |{}|", base + i * 16, hex.join(" "), ascii)
        })
        .collect()
}

/// Render a boolean as "yes"/"no"
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
