//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use st25dv_core::regs::{AreaProtection, RfPasswordControl};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u64
pub fn parse_hex_u64(s: &str) -> Result<u64, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u64>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u16
pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let value = parse_hex_u64(s)?;
    u16::try_from(value).map_err(|_| format!("Value out of range: {}", s))
}

/// Parse a string as a hex or decimal u8
pub fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u64(s)?;
    u8::try_from(value).map_err(|_| format!("Value out of range: {}", s))
}

/// Raw bytes given on the command line in hex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

/// Parse a byte string such as `DEADBEEF`, `de:ad:be:ef` or `0xde 0xad`
pub fn parse_hex_bytes(s: &str) -> Result<HexBytes, String> {
    let digits: String = s
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|tok| {
            tok.strip_prefix("0x")
                .or_else(|| tok.strip_prefix("0X"))
                .unwrap_or(tok)
        })
        .collect();

    if digits.is_empty() {
        return Err("No data given".to_string());
    }
    if !digits.is_ascii() {
        return Err(format!("Non-hex characters in '{}'", s));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in '{}'", s));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("Invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect::<Result<Vec<u8>, String>>()
        .map(HexBytes)
}

#[derive(Parser)]
#[command(name = "st25dv")]
#[command(author, version, about = "ST25DV dynamic NFC tag tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Bus backend, as name[:key=value,...] (see list-buses)
    #[arg(short = 'p', long = "bus", global = true)]
    pub bus: Option<String>,

    /// Skip settle delays and password verification; the caller times writes
    #[arg(long, global = true)]
    pub no_delay: bool,

    /// Refuse configuration writes while the security session is closed
    #[arg(long, global = true)]
    pub strict: bool,

    /// Present this I2C password (hex or decimal) before running the command
    #[arg(long, global = true, value_parser = parse_hex_u64)]
    pub password: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available bus backends
    ListBuses,

    /// Show tag identification and configuration
    Info,

    /// Show dynamic status registers
    Status,

    /// Read user memory
    Read {
        /// Start offset (hex or decimal)
        #[arg(long, value_parser = parse_hex_u16, default_value = "0")]
        offset: u16,

        /// Number of bytes (defaults to the rest of user memory)
        #[arg(long, value_parser = parse_hex_u16)]
        length: Option<u16>,

        /// Write the bytes to a file instead of printing a hex dump
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write user memory
    Write {
        /// Start offset (hex or decimal)
        #[arg(long, value_parser = parse_hex_u16, default_value = "0")]
        offset: u16,

        /// Bytes to write, in hex (e.g. "DEADBEEF" or "de:ad:be:ef")
        #[arg(long, value_parser = parse_hex_bytes, conflicts_with = "input")]
        data: Option<HexBytes>,

        /// Read the bytes to write from a file
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Open the I2C security session with --password
    Unlock,

    /// Close the I2C security session
    Lock,

    /// Change the I2C password (session must be open)
    Passwd {
        /// New password (hex or decimal)
        #[arg(long, value_parser = parse_hex_u64)]
        new: u64,
    },

    /// Show the user memory areas and their protection
    Zones,

    /// System configuration changes (session must be open)
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Fast transfer mode mailbox
    #[command(subcommand)]
    Mailbox(MailboxCommands),
}

/// System configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set the last 32-byte block of an area (ENDA1-3)
    SetEnd {
        /// Area (1-3)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        area: u8,

        /// Last block of the area (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        end: u8,
    },

    /// Set the RF protection of an area
    SetRfProtect {
        /// Area (1-4)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        area: u8,

        /// Access protection
        #[arg(value_enum)]
        protection: ProtectionArg,

        /// RF password guarding the area (0 = none, 1-3)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
        rf_password: Option<u8>,
    },

    /// Set the I2C protection of an area
    SetI2cProtect {
        /// Area (1-4)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        area: u8,

        /// Access protection
        #[arg(value_enum)]
        protection: ProtectionArg,
    },

    /// Show or change the boot-time GPO configuration
    Gpo {
        /// Enable or disable the GPO output
        #[arg(long)]
        enable: Option<bool>,

        /// Interrupt source bits 0-6 (hex or decimal)
        #[arg(long, value_parser = parse_hex_u8)]
        sources: Option<u8>,
    },
}

/// Mailbox subcommands
#[derive(Subcommand)]
pub enum MailboxCommands {
    /// Enable the mailbox
    Enable,

    /// Disable the mailbox, discarding any message
    Disable,

    /// Read the pending message
    Read,

    /// Put a message into the mailbox
    Write {
        /// Message bytes in hex (1-256 bytes)
        #[arg(value_parser = parse_hex_bytes)]
        data: HexBytes,
    },
}

/// Area protection as accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProtectionArg {
    /// Read and write always allowed
    Open,
    /// Write needs an open session
    Write,
    /// Read and write need an open session
    ReadWrite,
    /// Read needs an open session, write forbidden
    Locked,
}

impl From<ProtectionArg> for AreaProtection {
    fn from(arg: ProtectionArg) -> Self {
        match arg {
            ProtectionArg::Open => AreaProtection::Open,
            ProtectionArg::Write => AreaProtection::WriteProtected,
            ProtectionArg::ReadWrite => AreaProtection::ReadWriteProtected,
            ProtectionArg::Locked => AreaProtection::ReadProtectedWriteForbidden,
        }
    }
}

/// Map an RF password number (0-3) to its control value
pub fn rf_password_control(number: u8) -> RfPasswordControl {
    RfPasswordControl::from_bits(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_hex_u64("0x1122334455667788").unwrap(), 0x1122_3344_5566_7788);
        assert_eq!(parse_hex_u64("42").unwrap(), 42);
        assert_eq!(parse_hex_u16("0x01FF").unwrap(), 0x01FF);
        assert!(parse_hex_u16("0x10000").is_err());
        assert!(parse_hex_u8("256").is_err());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("DEADBEEF").unwrap().0, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex_bytes("de:ad").unwrap().0, vec![0xDE, 0xAD]);
        assert_eq!(parse_hex_bytes("0x01 0x02").unwrap().0, vec![1, 2]);
        assert!(parse_hex_bytes("ABC").is_err());
        assert!(parse_hex_bytes("").is_err());
        assert!(parse_hex_bytes("zz").is_err());
        assert!(parse_hex_bytes("a\u{e9}a").is_err());
        assert!(parse_hex_bytes("\u{e9}\u{e9}").is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "st25dv",
            "zones",
            "-p",
            "dummy:size=16k",
            "--password",
            "0x10",
            "--strict",
            "-vv",
        ]).unwrap();
        assert_eq!(cli.bus.as_deref(), Some("dummy:size=16k"));
        assert_eq!(cli.password, Some(0x10));
        assert!(cli.strict);
        assert!(!cli.no_delay);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Zones));
    }

    #[test]
    fn test_area_ranges() {
        assert!(Cli::try_parse_from(["st25dv", "config", "set-end", "4", "0x10"]).is_err());
        assert!(Cli::try_parse_from(["st25dv", "config", "set-i2c-protect", "4", "write"]).is_ok());
        assert!(
            Cli::try_parse_from(["st25dv", "config", "set-i2c-protect", "5", "write"]).is_err()
        );
    }
}
