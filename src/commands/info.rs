//! Tag identification and status display

use super::{yes_no, CmdResult, Tag};
use st25dv_core::regs::{EhMode, GpoConfig};

/// Show identification and boot-time configuration
pub fn cmd_info(tag: &mut Tag) -> CmdResult {
    let capacity = tag.capacity();

    println!("Tag:             {}", capacity);
    println!("UID:             {:016X}", tag.uid()?);
    println!("IC reference:    0x{:02X}", tag.ic_ref()?);
    println!("IC revision:     0x{:02X}", tag.revision()?);
    println!(
        "User memory:     {} bytes (0x0000-0x{:04X})",
        capacity.user_memory_size(),
        capacity.last_user_address()
    );
    println!("MEM_SIZE:        0x{:04X}", tag.mem_blocks()?);
    println!("Block size:      {} bytes", u16::from(tag.block_size()?) + 1);
    println!(
        "DSFID:           0x{:02X} (locked: {})",
        tag.dsfid()?,
        yes_no(tag.dsfid_lock()? & 1 != 0)
    );
    println!(
        "AFI:             0x{:02X} (locked: {})",
        tag.afi()?,
        yes_no(tag.afi_lock()? & 1 != 0)
    );

    println!();
    println!("Configuration:");
    let gpo = tag.gpo_config()?;
    println!(
        "  GPO:           {} sources {:?}",
        if gpo.contains(GpoConfig::GPO_EN) {
            "enabled,"
        } else {
            "disabled,"
        },
        gpo & GpoConfig::MODE
    );
    println!("  IT pulse:      code {}", tag.interrupt_pulse()?);
    let eh = match tag.eh_mode()? {
        EhMode::ForcedAtBoot => "forced at boot",
        EhMode::OnDemand => "on demand",
    };
    println!("  EH mode:       {}", eh);
    println!("  RF management: {:?}", tag.rf_management()?);
    println!("  Mailbox mode:  {}", if tag.mailbox_mode()? { "allowed" } else { "forbidden" });
    println!("  MB watchdog:   code {}", tag.mailbox_watchdog()?);
    println!("  CC file lock:  0x{:02X}", tag.cc_file_lock()?);
    println!("  Config locked: {}", yes_no(tag.config_locked()?));
    println!("  I2C session:   {}", if tag.is_unlocked()? { "open" } else { "closed" });

    Ok(())
}

/// Show the volatile dynamic registers
pub fn cmd_status(tag: &mut Tag) -> CmdResult {
    let eh = tag.energy_harvest_status()?;
    let rf = tag.rf_management_dyn()?;
    let gpo = tag.gpo_mode_dyn()?;
    let gpo_on = tag.gpo_enabled_dyn()?;
    let mailbox = tag.mailbox_status()?;
    let mb_len = tag.mailbox_message_len()?;
    let sso = tag.is_unlocked()?;
    // IT_STS_Dyn clears on read
    let it = tag.interrupt_status()?;

    println!("GPO output:      {}", if gpo_on { "enabled" } else { "disabled" });
    println!("GPO sources:     {:?}", gpo & GpoConfig::MODE);
    println!("Energy harvest:  {:?}", eh);
    println!("RF management:   {:?}", rf);
    println!("I2C session:     {}", if sso { "open" } else { "closed" });
    println!("Mailbox:         {:?}", mailbox);
    println!("Message length:  {}", mb_len);
    println!("Interrupts:      {:?}", it);

    Ok(())
}
