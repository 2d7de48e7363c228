//! Fast transfer mode mailbox commands

use super::{hex_dump, CmdResult, Tag};
use crate::cli::MailboxCommands;
use st25dv_core::regs::MAILBOX_SIZE;

/// Run a mailbox subcommand
pub fn cmd_mailbox(tag: &mut Tag, cmd: MailboxCommands) -> CmdResult {
    match cmd {
        MailboxCommands::Enable => {
            if !tag.mailbox_mode()? {
                log::warn!("MB_MODE forbids the mailbox; the tag will ignore the enable");
            }
            tag.set_mailbox_enabled(true)?;
            println!(
                "Mailbox {}",
                if tag.mailbox_enabled()? { "enabled" } else { "still disabled" }
            );
        }
        MailboxCommands::Disable => {
            tag.set_mailbox_enabled(false)?;
            println!("Mailbox disabled");
        }
        MailboxCommands::Read => {
            let mut buf = [0u8; MAILBOX_SIZE];
            let len = tag.read_mailbox(&mut buf)?;
            if len == 0 {
                println!("Mailbox empty");
            } else {
                println!("{} byte message:", len);
                hex_dump(0, &buf[..len]);
            }
        }
        MailboxCommands::Write { data } => {
            if !tag.mailbox_enabled()? {
                return Err("Mailbox is disabled (run 'mailbox enable' first)".into());
            }
            tag.write_mailbox(&data.0)?;
            println!("Put {} byte message", data.0.len());
        }
    }
    Ok(())
}
