use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use thiserror::Error;

pub const DEFAULT_BLOCK_SIZE: usize = 32768;
pub const DEFAULT_BLOCKS: u64 = 2048;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--mode is required")]
    MissingMode,
    #[error("unknown --mode argument {0:?}")]
    UnknownMode(String),
    #[error("--path is required")]
    MissingPath,
    #[error("--block-size must be greater than zero")]
    ZeroBlockSize,
    #[error("--blocks times --block-size does not fit in 64 bits")]
    TooLarge,
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
    /// Write the file, pause, then read it back and compare digests.
    Both,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Mode::Read),
            "write" => Ok(Mode::Write),
            "both" => Ok(Mode::Both),
            "" => Err(ConfigError::MissingMode),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Read => "read",
            Mode::Write => "write",
            Mode::Both => "both",
        };
        f.write_str(name)
    }
}

/// Parameters of a single run. Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    mode: Mode,
    path: PathBuf,
    block_size: usize,
    blocks: u64,
    iter_sleep: Duration,
    sync: bool,
}

impl Config {
    pub fn new(
        mode: Mode,
        path: impl Into<PathBuf>,
        block_size: usize,
        blocks: u64,
        iter_sleep: Duration,
        sync: bool,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath);
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if blocks.checked_mul(block_size as u64).is_none() {
            return Err(ConfigError::TooLarge);
        }
        Ok(Self {
            mode,
            path,
            block_size,
            blocks,
            iter_sleep,
            sync,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks to write. Reads ignore it and stop at end of file.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    pub fn iter_sleep(&self) -> Duration {
        self.iter_sleep
    }

    pub fn sync(&self) -> bool {
        self.sync
    }

    /// Size of the file a completed write leaves behind. Checked against
    /// overflow in [`Config::new`].
    pub fn total_write_bytes(&self) -> u64 {
        self.blocks * self.block_size as u64
    }
}
