#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Poll, Result, Sequencer, Stamp, sync::Mutex, time::TimeSource};

/// A lock-based sequencer suitable for multi-threaded environments.
///
/// The last issued [`Stamp`] lives behind a single [`Mutex`]; each call holds
/// it only for the compare-and-advance of that stamp.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads
///
/// ## See Also
/// - [`AtomicSequencer`]
///
/// [`AtomicSequencer`]: crate::AtomicSequencer
#[derive(Debug)]
pub struct LockSequencer<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<Stamp>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<Stamp>,
    time: T,
}

impl<T> LockSequencer<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockSequencer`] that has not issued anything yet.
    ///
    /// # Example
    /// ```
    /// use stampid::{LockSequencer, Sequencer, SystemClock};
    ///
    /// let sequencer = LockSequencer::new(SystemClock);
    /// let first = sequencer.try_next().unwrap();
    /// let second = sequencer.try_next().unwrap();
    /// assert!(first < second);
    /// ```
    pub fn new(time: T) -> Self {
        Self::from_stamp(Stamp::default(), time)
    }

    /// Creates a sequencer that behaves as if `last` was the last stamp it
    /// issued.
    ///
    /// Mostly useful in tests, or to resume after a stamp persisted elsewhere.
    pub fn from_stamp(last: Stamp, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(last)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(last),
            time,
        }
    }

    /// Returns the time source this sequencer reads.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Attempts to issue the next stamp.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { stamp })`: a new stamp was issued
    /// - `Ok(Poll::Pending { yield_for })`: the sequence space is exhausted
    ///   until the clock advances
    /// - `Err(e)`: the lock was poisoned
    ///
    /// # Errors
    /// - Returns an error if the underlying lock has been poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll(&self) -> Result<Poll> {
        let mut last = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read the clock under the lock, otherwise a caller holding an older
        // reading could be served after one holding a newer reading.
        let now = self.time.current_millis();
        let poll = last.advance(now);
        if let Poll::Ready { stamp } = poll {
            *last = stamp;
        }
        Ok(poll)
    }
}

impl<T> Sequencer for LockSequencer<T>
where
    T: TimeSource,
{
    fn try_poll(&self) -> Result<Poll> {
        self.try_poll()
    }
}
