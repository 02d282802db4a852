//! `--iter-sleep` values such as `1ms`, `250us` or `2m 30s`, parsed by
//! `humantime`. Go-style fractional spans (`1.5s`, `.5ms`) and `µs` are
//! accepted on top of that and summed exactly in nanoseconds.

use std::{sync::LazyLock, time::Duration};

use regex::Regex;

use crate::config::ConfigError;

const NANOS_PER_SEC: u128 = 1_000_000_000;
const PAIR: &str = r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)";
// digits past this are below a nanosecond for every unit up to hours
const MAX_FRACTION_DIGITS: usize = 18;

static FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^\\+?(?:{PAIR})+$")).expect("valid duration regex"));
static PAIRS: LazyLock<Regex> = LazyLock::new(|| Regex::new(PAIR).expect("valid duration regex"));

pub fn parse(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s == "0" || s == "+0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s)
        .ok()
        .or_else(|| parse_fractional(s))
        .ok_or_else(|| ConfigError::InvalidDuration(s.to_string()))
}

fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        // only "h" is left after the regex
        _ => 3600 * NANOS_PER_SEC,
    }
}

fn parse_fractional(s: &str) -> Option<Duration> {
    if !FULL.is_match(s) {
        return None;
    }
    let mut nanos = 0u128;
    for caps in PAIRS.captures_iter(s) {
        let unit = unit_nanos(&caps[2]);
        let (whole, fraction) = caps[1].split_once('.').unwrap_or((&caps[1], ""));
        if !whole.is_empty() {
            nanos = nanos.checked_add(whole.parse::<u128>().ok()?.checked_mul(unit)?)?;
        }
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let scale = 10u128.pow(fraction.len() as u32);
            nanos = nanos.checked_add(fraction.parse::<u128>().ok()? * unit / scale)?;
        }
    }
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}
