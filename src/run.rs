use std::{fmt, time::Duration};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::{
    cancel::Cancel,
    config::{Config, Mode},
    reader::{self, ReadSummary},
    writer::{self, WriteSummary},
};

/// Pause between the write and the read half of `--mode both`, so the two
/// phases show up as separate bursts to whatever is watching the disk.
pub const COMBINED_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub enum Summary {
    Write(WriteSummary),
    Read(ReadSummary),
    Both {
        write: WriteSummary,
        read: ReadSummary,
    },
}

impl Summary {
    /// Lines suitable for an operator log, one fact each.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Summary::Write(w) => vec![
                format!("wrote {} bytes in {} blocks", w.bytes, w.blocks),
                format!("SHA-256 hash: {}", w.digest),
            ],
            Summary::Read(r) => vec![
                format!("read {} bytes", r.bytes),
                format!("SHA-256 hash: {}", r.digest),
            ],
            Summary::Both { write, read } => vec![
                format!("wrote {} bytes in {} blocks", write.bytes, write.blocks),
                format!("read {} bytes", read.bytes),
                format!("SHA-256 hash: {}", read.digest),
            ],
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join(", "))
    }
}

pub fn run(config: &Config, cancel: &Cancel) -> Result<Summary> {
    match config.mode() {
        Mode::Write => writer::write(config, cancel).map(Summary::Write),
        Mode::Read => reader::read(config, cancel).map(Summary::Read),
        Mode::Both => run_both(config, cancel, COMBINED_PAUSE),
    }
}

fn run_both(config: &Config, cancel: &Cancel, pause: Duration) -> Result<Summary> {
    let write = writer::write(config, cancel)?;
    info!("Pausing for {:?} before reading back", pause);
    cancel.sleep(pause).context("pausing cancelled")?;
    let read = reader::read(config, cancel)?;
    if read.digest != write.digest || read.bytes != write.bytes {
        bail!(
            "read back {} bytes with hash {}, but wrote {} bytes with hash {}",
            read.bytes,
            read.digest,
            write.bytes,
            write.digest
        );
    }
    Ok(Summary::Both { write, read })
}
