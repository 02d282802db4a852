use std::time::{Duration, Instant};

use crossbeam::{
    channel::{self, Receiver},
    select,
};

use crate::cancel::{Cancel, Cancelled};

/// Fires every `period`, first one `period` after creation.
///
/// A tick missed while the caller was busy is delivered once, right away, and
/// the next one is scheduled a full period later, so ticks never come back to back.
#[derive(Debug)]
pub struct Ticker {
    ticks: Receiver<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            ticks: channel::tick(period),
        }
    }

    pub fn tick(&self, cancel: &Cancel) -> Result<(), Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        select! {
            recv(cancel.done()) -> _ => Err(Cancelled),
            recv(self.ticks) -> _ => Ok(()),
        }
    }
}
