use std::{
    fs::OpenOptions,
    io::Write,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use rand::{RngCore, rngs::OsRng};
use tracing::{debug, info};

use crate::{
    cancel::Cancel,
    config::Config,
    digest::{Digest, Hasher},
    ticker::Ticker,
};

#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub bytes: u64,
    pub blocks: u64,
    pub digest: Digest,
    pub elapsed: Duration,
}

/// Creates or truncates the configured file and appends `blocks` blocks of
/// random bytes, one per tick. With `sync` set the file is flushed to disk
/// before returning.
pub fn write(config: &Config, cancel: &Cancel) -> Result<WriteSummary> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config.path())
        .context("failed to create file for writing")?;

    let mut buf = vec![0u8; config.block_size()];
    let mut hasher = Hasher::new();
    let ticker = Ticker::new(config.iter_sleep());
    let mut total = 0u64;
    let start = Instant::now();
    info!(
        "Starting write to {:?} ({} blocks, {} bytes)",
        config.path(),
        config.blocks(),
        config.total_write_bytes()
    );

    for block in 0..config.blocks() {
        ticker.tick(cancel).context("writing cancelled")?;

        OsRng
            .try_fill_bytes(&mut buf)
            .context("failed to generate random bytes to write to file")?;
        file.write_all(&buf).context("failed to write segment to file")?;
        hasher.update(&buf);
        total += buf.len() as u64;
        debug!(block, bytes = buf.len(), "wrote block");
    }

    if config.sync() {
        file.sync_all().context("failed to sync the written file")?;
        debug!("synced {:?}", config.path());
    }

    let elapsed = start.elapsed();
    let digest = hasher.finalize();
    info!(
        "Writing finished to {:?} ({} bytes in {:?})",
        config.path(),
        total,
        elapsed
    );
    info!("SHA-256 hash: {}", digest);
    Ok(WriteSummary {
        bytes: total,
        blocks: config.blocks(),
        digest,
        elapsed,
    })
}
