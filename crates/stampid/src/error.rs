/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `stampid` can emit from generation.
///
/// Malformed identifiers and exhausted constraint retries are not errors: the
/// facade reports both as `None`. What remains are caller misuse, a clock
/// outside the printable range and, with the standard library mutex, lock
/// poisoning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A generation call was made before the node was initialized.
    #[error("generator used before a node was initialized")]
    Uninitialized,

    /// The prefix handed to a generation call was empty.
    ///
    /// Every identifier carries at least one prefix character, otherwise it
    /// could not be told apart from a truncated one when decoded.
    #[error("identifier prefix must not be empty")]
    EmptyPrefix,

    /// The clock read an instant the identifier format cannot print, such as
    /// a year outside `2000..=2099`.
    #[error(transparent)]
    Encode(#[from] crate::EncodeError),

    /// The operation failed because a lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, locks do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
