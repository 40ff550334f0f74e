use core::fmt;
use std::sync::OnceLock;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, Result};

/// The largest node value representable in the four-digit node field.
pub const MAX_NODE: u16 = 9_999;

const NODE_SPACE: u64 = MAX_NODE as u64 + 1;

/// The four-digit identity of the process minting identifiers.
///
/// Two processes that share a node can mint colliding identifiers, so the
/// value must be distinct across the fleet for uniqueness to hold. Nothing here
/// coordinates that; the seed is expected to come from configuration or host
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u16);

impl NodeId {
    /// Wraps an already-reduced node value.
    ///
    /// Returns `None` when `node` does not fit in four decimal digits.
    #[must_use]
    pub const fn new(node: u16) -> Option<Self> {
        if node <= MAX_NODE {
            Some(Self(node))
        } else {
            None
        }
    }

    /// Reduces an arbitrary seed into the node space with `seed % 10_000`.
    ///
    /// Seeds already below 10 000 map to themselves, so a configured node
    /// number prints unchanged in the identifier.
    ///
    /// ```
    /// use stampid::NodeId;
    ///
    /// assert_eq!(NodeId::from_seed(23).get(), 23);
    /// assert_eq!(NodeId::from_seed(1_234_567).get(), 4_567);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_seed(seed: u64) -> Self {
        // The remainder is below 10 000 and always fits.
        Self((seed % NODE_SPACE) as u16)
    }

    /// Returns the raw node value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl From<NodeId> for u16 {
    fn from(node: NodeId) -> Self {
        node.0
    }
}

/// Holds the node a generator stamps into every identifier.
///
/// The resolver starts empty and is set exactly once. Later calls to
/// [`NodeResolver::initialize`] leave the first node in place and return it,
/// including when several threads race to initialize.
#[derive(Debug, Default)]
pub struct NodeResolver {
    node: OnceLock<NodeId>,
}

impl NodeResolver {
    /// Creates an uninitialized resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            node: OnceLock::new(),
        }
    }

    /// Resolves `seed` into a node and stores it if no node is set yet.
    ///
    /// Returns the node in force after the call, which differs from the one
    /// derived from `seed` when the resolver was already initialized.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn initialize(&self, seed: u64) -> NodeId {
        let requested = NodeId::from_seed(seed);
        let node = *self.node.get_or_init(|| {
            #[cfg(feature = "tracing")]
            tracing::info!(node = %requested, "node initialized");
            requested
        });
        #[cfg(feature = "tracing")]
        if node != requested {
            tracing::debug!(
                %node,
                %requested,
                "node already initialized, keeping the first value"
            );
        }
        node
    }

    /// Returns the resolved node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] if [`NodeResolver::initialize`] has not
    /// been called yet.
    pub fn get(&self) -> Result<NodeId> {
        self.node.get().copied().ok_or(Error::Uninitialized)
    }

    /// Returns `true` once a node has been set.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.node.get().is_some()
    }
}
