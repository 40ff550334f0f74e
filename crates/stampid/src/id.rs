use core::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{NodeId, ParseError, codec};

/// A decoded identifier.
///
/// An `Id` is immutable: it is produced either by a generator or by decoding
/// text, and every field agrees with the textual form returned by
/// [`Id::as_str`].
///
/// The text is `prefix` followed by 22 digits:
///
/// ```text
/// <prefix><YY><MM><DD><HH><mm><SS><mmm><node:4><seq:3>
/// ```
///
/// # Example
///
/// ```
/// use stampid::Id;
///
/// let id: Id = "ABC2011250959030643972247".parse().unwrap();
/// assert_eq!(id.prefix(), "ABC");
/// assert_eq!(id.node().get(), 3972);
/// assert_eq!(id.sequence(), 247);
/// assert_eq!(
///     id.generated_at().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
///     "2020-11-25T09:59:03.064Z"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Id {
    pub(crate) text: String,
    pub(crate) prefix_len: usize,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) node: NodeId,
    pub(crate) sequence: u16,
}

impl Id {
    /// The caller-supplied prefix, verbatim.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.text[..self.prefix_len]
    }

    /// The millisecond instant the identifier was minted at, in UTC.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// The node that minted the identifier.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// The per-millisecond sequence number, in `0..=999`.
    #[must_use]
    pub const fn sequence(&self) -> u16 {
        self.sequence
    }

    /// The full textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the identifier, returning its textual form.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.text
    }
}

impl FromStr for Id {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::decode(s)
    }
}

impl TryFrom<&str> for Id {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        codec::decode(s)
    }
}

// Identifiers sort the way their text does.
impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}
