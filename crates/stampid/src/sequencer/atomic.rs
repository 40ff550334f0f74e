use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{MAX_SEQUENCE, Poll, Result, Sequencer, Stamp, time::TimeSource};

const SEQUENCE_BITS: u32 = 10;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

const _: () = assert!(MAX_SEQUENCE as u64 <= SEQUENCE_MASK);

/// Largest millisecond timestamp an [`AtomicSequencer`] can hold.
pub const MAX_ATOMIC_MILLIS: u64 = u64::MAX >> SEQUENCE_BITS;

/// Callers keep `stamp.millis <= MAX_ATOMIC_MILLIS` and
/// `stamp.sequence <= MAX_SEQUENCE`.
const fn pack(stamp: Stamp) -> u64 {
    (stamp.millis << SEQUENCE_BITS) | stamp.sequence as u64
}

#[allow(clippy::cast_possible_truncation)]
const fn unpack(raw: u64) -> Stamp {
    Stamp::new(raw >> SEQUENCE_BITS, (raw & SEQUENCE_MASK) as u16)
}

/// A lock-free sequencer suitable for multi-threaded environments.
///
/// The last issued [`Stamp`] is packed into a single [`AtomicU64`]
/// (`millis << 10 | sequence`) and advanced with compare-and-swap.
///
/// ## Features
/// - ✅ Thread-safe
/// - ❌ Fair access across threads
///
/// ## Caveats
/// Packing leaves 54 bits for the millisecond timestamp, which covers dates
/// far past the range the two-digit year can print. Clock readings and
/// starting stamps beyond [`MAX_ATOMIC_MILLIS`] are clamped to it.
///
/// ## Recommended When
/// - Throughput under contention matters more than fairness
///
/// ## See Also
/// - [`LockSequencer`]
///
/// [`LockSequencer`]: crate::LockSequencer
#[derive(Debug)]
pub struct AtomicSequencer<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    time: T,
}

impl<T> AtomicSequencer<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicSequencer`] that has not issued anything yet.
    ///
    /// # Example
    /// ```
    /// use stampid::{AtomicSequencer, MonotonicClock, Sequencer};
    ///
    /// let sequencer = AtomicSequencer::new(MonotonicClock::new());
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
    /// `last.millis` is clamped to [`MAX_ATOMIC_MILLIS`] and `last.sequence`
    /// to [`MAX_SEQUENCE`].
    pub fn from_stamp(last: Stamp, time: T) -> Self {
        let last = Stamp::new(
            last.millis.min(MAX_ATOMIC_MILLIS),
            last.sequence.min(MAX_SEQUENCE),
        );
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(pack(last))),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(pack(last)),
            time,
        }
    }

    /// Returns the time source this sequencer reads.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Attempts to issue the next stamp.
    ///
    /// If another thread advanced the state between the load and the
    /// compare-and-swap, this returns [`Poll::Pending`] with a zero
    /// `yield_for` so the caller retries at once.
    ///
    /// # Errors
    /// - This method currently does not return any errors and always returns
    ///   `Ok`. It is marked as fallible to share the [`Sequencer`] signature.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll(&self) -> Result<Poll> {
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis().min(MAX_ATOMIC_MILLIS);

        let next = match unpack(current_raw).advance(now) {
            Poll::Ready { stamp } => stamp,
            pending @ Poll::Pending { .. } => return Ok(pending),
        };

        if self
            .state
            .compare_exchange(current_raw, pack(next), Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            Ok(Poll::Ready { stamp: next })
        } else {
            // Another thread won the race. Yield 0 to retry immediately.
            Ok(Poll::Pending { yield_for: 0 })
        }
    }
}

impl<T> Sequencer for AtomicSequencer<T>
where
    T: TimeSource,
{
    fn try_poll(&self) -> Result<Poll> {
        self.try_poll()
    }
}
