use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// A trait for time sources that return a wall-clock or monotonic timestamp.
///
/// This abstraction allows you to plug in the system clock, a monotonic timer,
/// or a mocked time source in tests.
///
/// The unit is **milliseconds since the UNIX epoch**. Identifiers print this
/// instant as a calendar date, so unlike a snowflake layout there is no custom
/// epoch to configure.
///
/// # Example
///
/// ```
/// use stampid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_606_298_343_064
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1_606_298_343_064);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the UNIX epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

fn unix_millis(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// The system wall clock.
///
/// Wall time may step backwards (NTP corrections, manual changes). Sequencers
/// absorb such regressions, so this is a safe default, but
/// [`MonotonicClock`] avoids them entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_millis(SystemTime::now())
    }
}

#[derive(Debug)]
struct Anchor {
    start: Instant,
    unix_millis: u64,
}

/// A monotonic time source aligned to wall time once, at construction.
///
/// The clock samples `SystemTime::now()` a single time and from then on adds
/// the elapsed [`Instant`] duration, so it never goes backward even if the
/// system clock is adjusted externally. Clones share the same anchor.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    anchor: Arc<Anchor>,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored to the current wall time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use stampid::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= before + 5);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_anchor(SystemTime::now())
    }

    /// Constructs a monotonic clock whose time zero is `anchor`.
    ///
    /// Useful to replay generation from a known instant.
    #[must_use]
    pub fn with_anchor(anchor: SystemTime) -> Self {
        Self {
            anchor: Arc::new(Anchor {
                start: Instant::now(),
                unix_millis: unix_millis(anchor),
            }),
        }
    }

    /// Time elapsed since the clock was anchored.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.anchor.start.elapsed()
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        let elapsed = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.anchor.unix_millis.saturating_add(elapsed)
    }
}
