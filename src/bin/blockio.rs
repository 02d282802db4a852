use std::{io::IsTerminal, path::PathBuf, process::ExitCode, str::FromStr, time::Duration};

use anyhow::Result;
use blockio::{
    Config, Mode,
    cancel,
    config::{DEFAULT_BLOCK_SIZE, DEFAULT_BLOCKS},
    duration, report, run,
};
use clap::Parser;
use tracing::{Level, error, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

#[derive(Debug, Parser)]
#[command(version, about = "Paced block-sized reads or writes against a single file")]
struct Opt {
    #[arg(long, value_parser = Mode::from_str, help = "Mode (read, write, both) to use when running")]
    mode: Mode,
    #[arg(long, help = "Path of the file to read/write from")]
    path: PathBuf,
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, help = "The size of each block to read/write")]
    block_size: usize,
    #[arg(long, default_value_t = DEFAULT_BLOCKS, help = "Number of blocks to write")]
    blocks: u64,
    #[arg(
        long,
        default_value = "1ms",
        value_parser = duration::parse,
        help = "Amount of time to sleep between read/write iterations (a single block read/written)"
    )]
    iter_sleep: Duration,
    #[arg(long, help = "Whether to sync at the end of a write operation")]
    sync: bool,
    #[arg(long, help = "Also send the final summary to the local syslog")]
    syslog: bool,
}

impl Opt {
    fn config(&self) -> Result<Config> {
        Ok(Config::new(
            self.mode,
            &self.path,
            self.block_size,
            self.blocks,
            self.iter_sleep,
            self.sync,
        )?)
    }
}

fn execute(opt: &Opt) -> Result<()> {
    let config = opt.config()?;
    let listener = cancel::listen()?;
    let summary = run(&config, listener.cancel())?;
    if opt.syslog {
        report::to_syslog(&summary)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout))
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .init();

    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(err) => {
            let _ = err.print();
            // usage errors exit 1 like every other failure, --help and --version exit 0
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match execute(&opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
