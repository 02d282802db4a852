use std::{
    fmt,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result};
use crossbeam::{
    atomic::AtomicCell,
    channel::{self, Receiver, Sender, TryRecvError},
    select,
};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("interrupted")]
pub struct Cancelled;

/// Cooperative cancellation shared between the signal listener and the running operation.
///
/// Nothing is ever sent on the channel: cancelling drops the only sender, which
/// disconnects every clone of `done` at once. Operations only look at it while
/// waiting for their next tick, so a transfer that has already started always
/// finishes.
#[derive(Clone)]
pub struct Cancel {
    trigger: Arc<AtomicCell<Option<Sender<()>>>>,
    done: Receiver<()>,
}

impl fmt::Debug for Cancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancel")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Default for Cancel {
    fn default() -> Self {
        let (trigger, done) = channel::bounded(0);
        Self {
            trigger: Arc::new(AtomicCell::new(Some(trigger))),
            done,
        }
    }
}

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        drop(self.trigger.take());
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.done.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Becomes ready, with an error, once cancelled. Meant for `select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.done
    }

    /// Sleeps for `duration` unless cancelled first.
    /// An already cancelled token fails even for a zero duration.
    pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        select! {
            recv(self.done) -> _ => Err(Cancelled),
            recv(channel::after(duration)) -> _ => Ok(()),
        }
    }
}

/// Background thread turning SIGINT/SIGTERM into [`Cancel::cancel`].
/// Dropping it unregisters the signals and joins the thread.
pub struct Listener {
    cancel: Cancel,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

pub fn listen() -> Result<Listener> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).context("failed to register signal handlers")?;
    let handle = signals.handle();
    let cancel = Cancel::new();
    let token = cancel.clone();
    let thread = thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                warn!(signal, "received signal, cancelling");
                token.cancel();
            }
            debug!("signal listener stopped");
        })
        .context("failed to spawn signal listener")?;
    Ok(Listener {
        cancel,
        handle,
        thread: Some(thread),
    })
}

impl Listener {
    pub fn cancel(&self) -> &Cancel {
        &self.cancel
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
