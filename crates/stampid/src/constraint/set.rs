use core::ops::Deref;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Constraint, Result, sync::RwLock};

/// An append-only list of constraints applied to every constrained
/// generation of a generator, unless the caller opts out.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: RwLock<Vec<Arc<dyn Constraint>>>,
}

impl ConstraintSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `constraint`. Registered constraints are evaluated in
    /// registration order and cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn register(&self, constraint: Arc<dyn Constraint>) -> Result<()> {
        let mut constraints = {
            #[cfg(feature = "parking-lot")]
            {
                self.constraints.write()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.constraints.write()?
            }
        };
        constraints.push(constraint);
        #[cfg(feature = "tracing")]
        tracing::debug!(total = constraints.len(), "global constraint registered");
        Ok(())
    }

    /// Number of registered constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if nothing has been registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// A copy of the registered constraints. The lock is released before the
    /// copy is returned, so constraints may register further constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying lock has been poisoned.
    pub fn snapshot(&self) -> Result<Vec<Arc<dyn Constraint>>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<impl Deref<Target = Vec<Arc<dyn Constraint>>> + '_> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.constraints.read())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.constraints.read()?)
        }
    }
}

impl core::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("ConstraintSet");
        if let Ok(len) = self.len() {
            s.field("len", &len);
        }
        s.finish_non_exhaustive()
    }
}
