//! Paced block I/O against a single file.
//!
//! Writes fixed-size blocks of random bytes, or reads a file back block by
//! block while hashing it, sleeping between blocks so the resulting disk
//! activity is easy to spot from the outside (cgroup blkio counters, iostat
//! and the like).

pub mod cancel;
pub mod config;
pub mod digest;
pub mod duration;
pub mod reader;
pub mod report;
pub mod run;
pub mod ticker;
pub mod writer;

pub use cancel::{Cancel, Cancelled};
pub use config::{Config, ConfigError, Mode};
pub use run::{Summary, run};
