use core::cmp::Ordering;

/// The largest sequence value that fits in the three-digit sequence field.
pub const MAX_SEQUENCE: u16 = 999;

/// A `(timestamp, sequence)` pair handed out by a [`Sequencer`].
///
/// Stamps order by timestamp first, then sequence, which is also the order
/// their encoded identifiers sort in.
///
/// [`Sequencer`]: crate::Sequencer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stamp {
    /// Milliseconds since the UNIX epoch.
    pub millis: u64,
    /// Disambiguates stamps within the same millisecond, in `0..=999`.
    pub sequence: u16,
}

impl Stamp {
    /// Creates a stamp from its components.
    #[must_use]
    pub const fn new(millis: u64, sequence: u16) -> Self {
        Self { millis, sequence }
    }

    /// Returns `true` if another stamp fits in the same millisecond.
    #[must_use]
    pub const fn has_sequence_room(self) -> bool {
        self.sequence < MAX_SEQUENCE
    }

    /// Computes the stamp that follows `self` when the clock reads `now`.
    ///
    /// A clock behind the last stamp is treated as if it still read the last
    /// stamp's millisecond, so the emitted timestamp never regresses.
    pub(crate) fn advance(self, now: u64) -> Poll {
        match now.cmp(&self.millis) {
            Ordering::Greater => Poll::Ready {
                stamp: Self::new(now, 0),
            },
            Ordering::Equal if self.has_sequence_room() => Poll::Ready {
                stamp: Self::new(self.millis, self.sequence + 1),
            },
            Ordering::Equal => Poll::Pending { yield_for: 1 },
            Ordering::Less => self.cold_clock_behind(now),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(self, now: u64) -> Poll {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            now,
            last = self.millis,
            "clock moved backwards, holding the last issued millisecond"
        );
        if self.has_sequence_room() {
            Poll::Ready {
                stamp: Self::new(self.millis, self.sequence + 1),
            }
        } else {
            Poll::Pending {
                yield_for: self.millis - now + 1,
            }
        }
    }
}

/// Represents the result of attempting to draw the next [`Stamp`].
///
/// - [`Poll::Ready`] carries a fresh stamp.
/// - [`Poll::Pending`] means the sequence space of the current millisecond is
///   exhausted (or a concurrent caller won a race) and the clock must be
///   re-read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Poll {
    /// A unique stamp was issued.
    Ready {
        /// The issued stamp.
        stamp: Stamp,
    },
    /// No stamp could be issued right now.
    Pending {
        /// Milliseconds the clock has to advance before a retry can succeed.
        /// Zero means a retry may succeed immediately.
        yield_for: u64,
    },
}
