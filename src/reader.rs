use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use nix::{
    fcntl::{OFlag, open},
    sys::stat::Mode,
    unistd::read as read_fd,
};
use tracing::{debug, info};

use crate::{
    cancel::Cancel,
    config::Config,
    digest::{Digest, Hasher},
    ticker::Ticker,
};

#[derive(Debug, Clone)]
pub struct ReadSummary {
    pub bytes: u64,
    pub digest: Digest,
    pub elapsed: Duration,
}

/// Reads the configured file one block per tick until end of file, hashing
/// everything that was read. The last block may be short.
pub fn read(config: &Config, cancel: &Cancel) -> Result<ReadSummary> {
    let fd = open(config.path(), OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())
        .context("failed to open file for reading")?;

    let mut buf = vec![0u8; config.block_size()];
    let mut hasher = Hasher::new();
    let ticker = Ticker::new(config.iter_sleep());
    let mut total = 0u64;
    let start = Instant::now();
    info!("Starting read from {:?}", config.path());

    loop {
        ticker.tick(cancel).context("reading cancelled")?;

        let n = read_fd(&fd, &mut buf).context("failed to read segment from file")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
        debug!(bytes = n, total, "read block");
    }

    let elapsed = start.elapsed();
    let digest = hasher.finalize();
    info!(
        "Reading finished from {:?} ({} bytes in {:?})",
        config.path(),
        total,
        elapsed
    );
    info!("SHA-256 hash: {}", digest);
    Ok(ReadSummary {
        bytes: total,
        digest,
        elapsed,
    })
}
