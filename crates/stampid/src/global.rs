//! A process-wide generator behind free functions.
//!
//! Services that want one generator per process, initialized once at
//! startup and reachable from anywhere, can use these functions instead of
//! threading an [`IdGenerator`] through their code. The generator is created
//! on first use with the system clock and [`DEFAULT_MAX_ATTEMPTS`].
//!
//! ```
//! use stampid::global;
//!
//! global::initialize(23);
//! let id = global::generate("ORD").unwrap();
//! assert_eq!(global::parse(id.as_str()), Some(id));
//! ```
//!
//! [`DEFAULT_MAX_ATTEMPTS`]: crate::DEFAULT_MAX_ATTEMPTS

use std::sync::{Arc, OnceLock};

use crate::{Constraint, Id, IdGenerator, NodeId, Result};

static GENERATOR: OnceLock<IdGenerator> = OnceLock::new();

/// The process-wide generator.
pub fn generator() -> &'static IdGenerator {
    GENERATOR.get_or_init(IdGenerator::new)
}

/// Sets the process node. Only the first call takes effect.
///
/// See [`IdGenerator::initialize`].
pub fn initialize(seed: u64) -> NodeId {
    generator().initialize(seed)
}

/// Mints a new identifier.
///
/// # Errors
///
/// See [`IdGenerator::generate`].
pub fn generate(prefix: &str) -> Result<Id> {
    generator().generate(prefix)
}

/// Mints an identifier accepted by every constraint.
///
/// # Errors
///
/// See [`IdGenerator::generate_with_constraints`].
pub fn generate_with_constraints(
    prefix: &str,
    constraints: &[&dyn Constraint],
    apply_global: bool,
) -> Result<Option<Id>> {
    generator().generate_with_constraints(prefix, constraints, apply_global)
}

/// Decodes `text`, returning `None` if it is malformed.
#[must_use]
pub fn parse(text: &str) -> Option<Id> {
    crate::parse(text)
}

/// Appends a constraint applied to every constrained generation in the
/// process.
///
/// # Errors
///
/// Returns an error if the underlying lock has been poisoned.
pub fn register_global_constraint(constraint: Arc<dyn Constraint>) -> Result<()> {
    generator().register_global_constraint(constraint)
}
