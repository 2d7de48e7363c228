//! st25dv - Command line access to ST25DV dynamic NFC tags
//!
//! Reads and writes user memory, manages the I2C security session, edits
//! the area protection configuration and drives the fast transfer mailbox
//! of an ST25DV04K/16K/64K over any compiled-in bus backend.

mod buses;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use st25dv_core::{DriverConfig, St25dv};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Commands::ListBuses = cli.command {
        commands::list_buses();
        return Ok(());
    }

    let bus_str = cli.bus.as_deref().ok_or_else(|| {
        format!(
            "No bus selected. Use -p/--bus <name[:options]>.\n{}",
            buses::bus_help()
        )
    })?;

    let mut config = DriverConfig::default();
    if cli.no_delay {
        config = config.external_timing();
    }
    if cli.strict {
        config = config.strict();
    }

    let bus = buses::open_bus(bus_str)?;
    let mut tag = St25dv::new(bus, config)?;

    if let Some(password) = cli.password {
        if !tag.present_password(password)? {
            log::warn!("Password rejected, security session is closed");
        }
    }

    match cli.command {
        Commands::ListBuses => Ok(()),
        Commands::Info => commands::info::cmd_info(&mut tag),
        Commands::Status => commands::info::cmd_status(&mut tag),
        Commands::Read {
            offset,
            length,
            output,
        } => commands::memory::cmd_read(&mut tag, offset, length, output.as_deref()),
        Commands::Write {
            offset,
            data,
            input,
        } => {
            let data = match (data, input) {
                (Some(data), _) => data.0,
                (None, Some(path)) => std::fs::read(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
                (None, None) => return Err("Nothing to write: use --data or --input".into()),
            };
            commands::memory::cmd_write(&mut tag, offset, &data)
        }
        Commands::Unlock => {
            if cli.password.is_none() {
                return Err("unlock needs --password".into());
            }
            commands::security::cmd_session(&mut tag)
        }
        Commands::Lock => commands::security::cmd_lock(&mut tag),
        Commands::Passwd { new } => commands::security::cmd_passwd(&mut tag, new),
        Commands::Zones => commands::zones::cmd_zones(&mut tag),
        Commands::Config(subcmd) => commands::zones::cmd_config(&mut tag, subcmd),
        Commands::Mailbox(subcmd) => commands::mailbox::cmd_mailbox(&mut tag, subcmd),
    }
}
