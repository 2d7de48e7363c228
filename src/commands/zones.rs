//! Area layout and configuration commands

use super::{CmdResult, Tag};
use crate::cli::{rf_password_control, ConfigCommands};
use st25dv_core::regs::{area_end_address, GpoConfig};

/// Number of user memory areas
const AREA_COUNT: u8 = 4;

/// Byte ranges of areas 1-4 given ENDA1-3
///
/// An area whose start lies past the end of the previous one is empty
/// and reported as `None`.
fn area_ranges(enda: [u8; 3], memory_end: u16) -> [Option<(u16, u16)>; 4] {
    let last = memory_end.saturating_sub(1);
    let mut ranges = [None; 4];
    let mut start: u32 = 0;
    for (i, range) in ranges.iter_mut().enumerate() {
        let end = match enda.get(i) {
            Some(&e) => area_end_address(e).min(last),
            None => last,
        };
        if start <= u32::from(end) {
            *range = Some((start as u16, end));
            start = u32::from(end) + 1;
        }
    }
    ranges
}

/// Show the area layout and protection settings
pub fn cmd_zones(tag: &mut Tag) -> CmdResult {
    let enda = [tag.area_end(1)?, tag.area_end(2)?, tag.area_end(3)?];
    let ranges = area_ranges(enda, tag.user_memory_end());

    println!(
        "{:<6} {:<13} {:<28} {:<10} {:<28}",
        "Area", "Range", "RF protection", "RF pwd", "I2C protection"
    );
    println!("{}", "-".repeat(88));

    for (area, range) in (1..=AREA_COUNT).zip(ranges) {
        let range = match range {
            Some((start, end)) => format!("{:04X}-{:04X}", start, end),
            None => "(empty)".to_string(),
        };
        let rf = tag.rf_protection(area)?;
        let pwd = tag.rf_password_control(area)?;
        let i2c = tag.i2c_protection(area)?;
        println!(
            "{:<6} {:<13} {:<28} {:<10} {:<28}",
            area,
            range,
            rf.to_string(),
            format!("{:?}", pwd),
            i2c.to_string()
        );
    }

    Ok(())
}

/// Apply a configuration change
pub fn cmd_config(tag: &mut Tag, cmd: ConfigCommands) -> CmdResult {
    match cmd {
        ConfigCommands::SetEnd { area, end } => {
            tag.set_area_end(area, end)?;
            println!(
                "Area {} now ends at 0x{:04X}",
                area,
                area_end_address(tag.area_end(area)?)
            );
        }
        ConfigCommands::SetRfProtect {
            area,
            protection,
            rf_password,
        } => {
            tag.set_rf_protection(area, protection.into())?;
            if let Some(number) = rf_password {
                tag.set_rf_password_control(area, rf_password_control(number))?;
            }
            println!(
                "Area {} RF protection: {} ({:?})",
                area,
                tag.rf_protection(area)?,
                tag.rf_password_control(area)?
            );
        }
        ConfigCommands::SetI2cProtect { area, protection } => {
            tag.set_i2c_protection(area, protection.into())?;
            println!("Area {} I2C protection: {}", area, tag.i2c_protection(area)?);
        }
        ConfigCommands::Gpo { enable, sources } => {
            if let Some(sources) = sources {
                let enabled = tag.gpo_config()? & GpoConfig::GPO_EN;
                let mode = GpoConfig::from_bits_truncate(sources) & GpoConfig::MODE;
                tag.set_gpo_config(enabled | mode)?;
            }
            if let Some(enable) = enable {
                tag.set_gpo_enabled(enable)?;
            }
            let gpo = tag.gpo_config()?;
            println!(
                "GPO {}, sources {:?}",
                if gpo.contains(GpoConfig::GPO_EN) {
                    "enabled"
                } else {
                    "disabled"
                },
                gpo & GpoConfig::MODE
            );
        }
    }
    Ok(())
}
