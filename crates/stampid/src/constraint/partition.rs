use core::fmt;
use std::sync::Arc;

use crate::{Constraint, Id};

/// Maps a key onto one of a fixed number of partitions.
pub trait KeyPartitioner: Send + Sync {
    /// The partition for `key`, in `0..self.partitions()`.
    fn partition(&self, key: &str) -> u32;

    /// Total number of partitions.
    fn partitions(&self) -> u32;
}

/// Partitions keys by the 32-bit polynomial string hash
/// (`h = 31 * h + unit` over UTF-16 code units), reduced by its absolute value
/// modulo the partition count.
///
/// This is the hash JVM services use for `String` keys, so routing decisions
/// agree with peers written against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JavaHashPartitioner {
    partitions: u32,
}

impl JavaHashPartitioner {
    /// Creates a partitioner over `partitions` buckets.
    ///
    /// Returns `None` if `partitions` is zero.
    #[must_use]
    pub const fn new(partitions: u32) -> Option<Self> {
        if partitions == 0 {
            None
        } else {
            Some(Self { partitions })
        }
    }

    /// The raw 32-bit string hash of `key`.
    ///
    /// ```
    /// use stampid::JavaHashPartitioner;
    ///
    /// assert_eq!(JavaHashPartitioner::hash(""), 0);
    /// assert_eq!(JavaHashPartitioner::hash("hello"), 99_162_322);
    /// ```
    #[must_use]
    pub fn hash(key: &str) -> i32 {
        key.encode_utf16()
            .fold(0_i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
    }
}

impl KeyPartitioner for JavaHashPartitioner {
    fn partition(&self, key: &str) -> u32 {
        Self::hash(key).unsigned_abs() % self.partitions
    }

    fn partitions(&self) -> u32 {
        self.partitions
    }
}

impl<P: KeyPartitioner + ?Sized> KeyPartitioner for Arc<P> {
    fn partition(&self, key: &str) -> u32 {
        (**self).partition(key)
    }

    fn partitions(&self) -> u32 {
        (**self).partitions()
    }
}

/// Extracts the key a [`PartitionConstraint`] hashes.
pub type KeyFn = fn(&Id) -> String;

fn id_text(id: &Id) -> String {
    id.as_str().to_owned()
}

/// Accepts an identifier only if its key lands in the target partition.
///
/// Independent generators configured with distinct targets over the same
/// partitioner claim disjoint shards of the identifier space, without talking
/// to each other.
///
/// By default the key is the identifier's full text.
///
/// # Example
///
/// ```
/// use stampid::{Constraint, Id, JavaHashPartitioner, KeyPartitioner, PartitionConstraint};
///
/// let partitioner = JavaHashPartitioner::new(16).unwrap();
/// let id: Id = "ABC2011250959030643972247".parse().unwrap();
/// let target = partitioner.partition(id.as_str());
///
/// let constraint = PartitionConstraint::new(target, partitioner).unwrap();
/// assert!(constraint.accepts(&id));
/// ```
pub struct PartitionConstraint<P = JavaHashPartitioner> {
    partition: u32,
    partitioner: P,
    key: KeyFn,
}

impl<P: KeyPartitioner> PartitionConstraint<P> {
    /// Targets `partition` under `partitioner`.
    ///
    /// Returns `None` if `partition` is not below the partitioner's count,
    /// since such a constraint could never accept anything.
    pub fn new(partition: u32, partitioner: P) -> Option<Self> {
        (partition < partitioner.partitions()).then_some(Self {
            partition,
            partitioner,
            key: id_text,
        })
    }

    /// Hashes the key returned by `key` instead of the identifier text.
    #[must_use]
    pub fn with_key(mut self, key: KeyFn) -> Self {
        self.key = key;
        self
    }

    /// The partition this constraint accepts.
    pub const fn partition(&self) -> u32 {
        self.partition
    }

    /// The partition `id` falls into.
    pub fn partition_of(&self, id: &Id) -> u32 {
        self.partitioner.partition(&(self.key)(id))
    }
}

impl<P: KeyPartitioner> Constraint for PartitionConstraint<P> {
    fn accepts(&self, id: &Id) -> bool {
        self.partition_of(id) == self.partition
    }
}

impl<P: KeyPartitioner> fmt::Debug for PartitionConstraint<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionConstraint")
            .field("partition", &self.partition)
            .field("partitions", &self.partitioner.partitions())
            .finish_non_exhaustive()
    }
}
