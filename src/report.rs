use std::path::Path;

use anyhow::{Context, Result};
use syslog::{Facility, Formatter3164, Logger, LoggerBackend};

use crate::run::Summary;

pub const SYSLOG_PROCESS: &str = "blockio";

fn formatter() -> Formatter3164 {
    Formatter3164 {
        facility: Facility::LOG_USER,
        hostname: None,
        process: SYSLOG_PROCESS.into(),
        pid: std::process::id(),
    }
}

fn connect(socket: Option<&Path>) -> Result<Logger<LoggerBackend, Formatter3164>> {
    match socket {
        Some(path) => syslog::unix_custom(formatter(), path),
        None => syslog::unix(formatter()),
    }
    .context("could not connect to syslog")
}

fn send(socket: Option<&Path>, summary: &Summary) -> Result<()> {
    let mut logger = connect(socket)?;
    for line in summary.lines() {
        logger.info(&line).context("failed to send to syslog")?;
    }
    Ok(())
}

/// Sends every summary line to the local syslog daemon at info level.
pub fn to_syslog(summary: &Summary) -> Result<()> {
    send(None, summary)
}
