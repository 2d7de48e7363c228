//! User memory read and write commands

use super::{hex_dump, CmdResult, Tag};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn progress_bar(len: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Number of bytes between `offset` and `requested` that fit in user memory
fn clamp_len(memory_end: u16, offset: u16, requested: Option<u16>) -> usize {
    let available = usize::from(memory_end.saturating_sub(offset));
    match requested {
        Some(len) => usize::from(len).min(available),
        None => available,
    }
}

/// Read user memory to a file or stdout
pub fn cmd_read(
    tag: &mut Tag,
    offset: u16,
    length: Option<u16>,
    output: Option<&Path>,
) -> CmdResult {
    let end = tag.user_memory_end();
    if offset >= end {
        return Err(format!(
            "Offset 0x{:04X} is past the end of user memory (0x{:04X})",
            offset, end
        )
        .into());
    }

    let len = clamp_len(end, offset, length);
    if let Some(requested) = length {
        if usize::from(requested) > len {
            log::warn!("Read truncated to {} bytes at the end of user memory", len);
        }
    }

    log::info!("Reading {} bytes at 0x{:04X}...", len, offset);
    let pb = progress_bar(len)?;
    let mut data = vec![0u8; len];
    for (addr, slot) in (offset..).zip(data.iter_mut()) {
        *slot = tag.read_byte(addr)?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(&data)?;
            println!("Wrote {} bytes to {}", len, path.display());
        }
        None => hex_dump(usize::from(offset), &data),
    }

    Ok(())
}

/// Write bytes into user memory
pub fn cmd_write(tag: &mut Tag, offset: u16, data: &[u8]) -> CmdResult {
    let end = tag.user_memory_end();
    let len = clamp_len(end, offset, u16::try_from(data.len()).ok());
    if len == 0 {
        return Err(format!(
            "Nothing fits at 0x{:04X} (user memory ends at 0x{:04X})",
            offset, end
        )
        .into());
    }
    if len < data.len() {
        log::warn!(
            "Only {} of {} bytes fit before the end of user memory",
            len,
            data.len()
        );
    }

    log::info!("Writing {} bytes at 0x{:04X}...", len, offset);
    let pb = progress_bar(len)?;
    for (addr, &value) in (offset..).zip(&data[..len]) {
        tag.write_byte(addr, value)?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!("Wrote {} bytes", len);
    Ok(())
}
