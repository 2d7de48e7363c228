//! Security session commands

use super::{CmdResult, Tag};
use st25dv_core::WriteTiming;

fn timing_is_external(tag: &Tag) -> bool {
    matches!(tag.config().timing, WriteTiming::External)
}

/// Report the session state after `--password` was presented
pub fn cmd_session(tag: &mut Tag) -> CmdResult {
    if timing_is_external(tag) {
        println!("Password presented (not verified with --no-delay)");
        return Ok(());
    }
    if tag.is_unlocked()? {
        println!("I2C security session open");
        Ok(())
    } else {
        Err("Password rejected, I2C security session closed".into())
    }
}

/// Close the security session
pub fn cmd_lock(tag: &mut Tag) -> CmdResult {
    if !tag.is_unlocked()? {
        println!("I2C security session already closed");
        return Ok(());
    }
    if tag.lock()? {
        return Err("I2C security session is still open".into());
    }
    println!("I2C security session closed");
    Ok(())
}

/// Replace the I2C password
pub fn cmd_passwd(tag: &mut Tag, new: u64) -> CmdResult {
    if !tag.is_unlocked()? {
        return Err("Changing the password needs an open session (use --password)".into());
    }
    let still_open = tag.change_i2c_password(new)?;
    println!(
        "I2C password changed, session {}",
        if still_open { "open" } else { "closed" }
    );
    Ok(())
}
