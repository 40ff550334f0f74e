use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Constraint, ConstraintSet, Error, Id, LockSequencer, NodeId, NodeResolver, Result, Sequencer,
    SystemClock, TimeSource, codec,
};


/// Attempt ceiling of [`IdGenerator::generate_with_constraints`] unless
/// configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;

/// Mints, filters, and parses identifiers.
///
/// A generator owns one [`Sequencer`], one [`NodeResolver`], and one
/// [`ConstraintSet`] of global constraints. It is `Sync` when its sequencer
/// is, so a single instance is meant to be shared by every caller in the
/// process (see [`crate::global`] for a ready-made one).
///
/// The generator starts uninitialized: every generation call fails with
/// [`Error::Uninitialized`] until [`IdGenerator::initialize`] sets the node.
///
/// # Example
///
/// ```
/// use stampid::IdGenerator;
///
/// let generator = IdGenerator::new();
/// generator.initialize(23);
///
/// let id = generator.generate("TXN").unwrap();
/// assert!(id.as_str().starts_with("TXN"));
/// assert_eq!(generator.parse(id.as_str()), Some(id));
/// ```
#[derive(Debug)]
pub struct IdGenerator<S = LockSequencer<SystemClock>> {
    sequencer: S,
    node: NodeResolver,
    constraints: ConstraintSet,
    max_attempts: usize,
}

impl IdGenerator {
    /// Creates an uninitialized generator reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sequencer(LockSequencer::new(SystemClock))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> IdGenerator<LockSequencer<T>> {
    /// Creates an uninitialized generator reading `time`.
    pub fn with_clock(time: T) -> Self {
        Self::with_sequencer(LockSequencer::new(time))
    }
}

impl<S: Sequencer> IdGenerator<S> {
    /// Creates an uninitialized generator drawing stamps from `sequencer`.
    pub fn with_sequencer(sequencer: S) -> Self {
        Self {
            sequencer,
            node: NodeResolver::new(),
            constraints: ConstraintSet::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the attempt ceiling of constrained generation. Values below one
    /// are raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The attempt ceiling of constrained generation.
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Resolves `seed` into the node stamped into every identifier.
    ///
    /// Only the first call takes effect; later calls return the node already
    /// in force. See [`NodeResolver::initialize`].
    pub fn initialize(&self, seed: u64) -> NodeId {
        self.node.initialize(seed)
    }

    /// The node in force.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] before [`IdGenerator::initialize`].
    pub fn node(&self) -> Result<NodeId> {
        self.node.get()
    }

    /// The global constraints applied by
    /// [`IdGenerator::generate_with_constraints`].
    pub const fn global_constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Appends a constraint to the global set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    pub fn register_global_constraint(&self, constraint: Arc<dyn Constraint>) -> Result<()> {
        self.constraints.register(constraint)
    }

    /// Appends several constraints to the global set, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    pub fn register_global_constraints<I>(&self, constraints: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Constraint>>,
    {
        constraints
            .into_iter()
            .try_for_each(|c| self.constraints.register(c))
    }

    /// Mints a new identifier starting with `prefix`.
    ///
    /// # Errors
    ///
    /// - [`Error::Uninitialized`] before [`IdGenerator::initialize`]
    /// - [`Error::EmptyPrefix`] if `prefix` is empty
    /// - [`Error::Encode`] if the clock reads a year outside `2000..=2099`
    /// - [`Error::LockPoisoned`] if the sequencer's lock is poisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self, prefix: &str) -> Result<Id> {
        if prefix.is_empty() {
            return Err(Error::EmptyPrefix);
        }
        let node = self.node.get()?;
        let stamp = self.sequencer.try_next()?;
        Ok(codec::encode(
            prefix,
            codec::instant_from_millis(stamp.millis),
            node,
            stamp.sequence,
        )?)
    }

    /// Mints identifiers until one satisfies every constraint, or the attempt
    /// ceiling is reached.
    ///
    /// Candidates are checked against the global constraints first (skipped
    /// when `apply_global` is `false`), then against `constraints`, in order.
    /// The first rejection discards the candidate. The global set is copied
    /// once per call, so constraints registered meanwhile take effect on the
    /// next call.
    ///
    /// Returns `Ok(None)` when no candidate was accepted within
    /// [`IdGenerator::max_attempts`] attempts.
    ///
    /// # Errors
    ///
    /// Same as [`IdGenerator::generate`].
    ///
    /// # Example
    ///
    /// ```
    /// use stampid::{IdGenerator, Reject};
    ///
    /// let generator = IdGenerator::new().with_max_attempts(10);
    /// generator.initialize(23);
    ///
    /// assert_eq!(generator.generate_with_constraints("TST", &[&Reject], false), Ok(None));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, constraints)))]
    pub fn generate_with_constraints(
        &self,
        prefix: &str,
        constraints: &[&dyn Constraint],
        apply_global: bool,
    ) -> Result<Option<Id>> {
        // Constraints registered after this point apply from the next call.
        let globals = if apply_global {
            self.constraints.snapshot()?
        } else {
            Vec::new()
        };

        for _ in 0..self.max_attempts {
            let id = self.generate(prefix)?;
            let accepted = globals.iter().all(|c| c.accepts(&id))
                && constraints.iter().all(|c| c.accepts(&id));
            if accepted {
                return Ok(Some(id));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            prefix,
            attempts = self.max_attempts,
            "no candidate satisfied the constraints"
        );
        Ok(None)
    }

    /// Decodes `text`, returning `None` if it is not a well-formed identifier.
    ///
    /// Parsing does not depend on the generator's state and works before
    /// initialization. Use [`decode`](crate::decode) for the reason a string was
    /// rejected.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Id> {
        parse(text)
    }
}

/// Decodes `text`, returning `None` if it is not a well-formed identifier.
///
/// ```
/// assert!(stampid::parse("ABC2011250959030643972247").is_some());
/// assert!(stampid::parse("TEST").is_none());
/// ```
#[must_use]
pub fn parse(text: &str) -> Option<Id> {
    codec::decode(text).ok()
}
