use std::sync::Arc;

use crate::{Poll, Result, Stamp};

/// The process-wide counter that hands out unique, non-decreasing stamps.
///
/// Implementations guard the last issued stamp with a single synchronization
/// primitive so that concurrent callers never observe the same stamp.
pub trait Sequencer {
    /// Attempts to issue the next stamp without waiting.
    ///
    /// # Errors
    ///
    /// May return an error if the implementation uses a lock and it is
    /// poisoned.
    fn try_poll(&self) -> Result<Poll>;

    /// Issues the next stamp, spinning on the clock while the current
    /// millisecond's sequence space is exhausted.
    ///
    /// The spin re-samples the clock instead of sleeping: the wait ends as
    /// soon as the millisecond advances.
    ///
    /// # Errors
    ///
    /// May return an error if the implementation uses a lock and it is
    /// poisoned.
    fn try_next(&self) -> Result<Stamp> {
        loop {
            match self.try_poll()? {
                Poll::Ready { stamp } => break Ok(stamp),
                Poll::Pending { .. } => core::hint::spin_loop(),
            }
        }
    }
}

impl<S: Sequencer + ?Sized> Sequencer for &S {
    fn try_poll(&self) -> Result<Poll> {
        (**self).try_poll()
    }
}

impl<S: Sequencer + ?Sized> Sequencer for Arc<S> {
    fn try_poll(&self) -> Result<Poll> {
        (**self).try_poll()
    }
}

