use core::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};

use crate::{Id, MAX_SEQUENCE, NodeId};

/// Number of digits following the prefix.
pub const SUFFIX_LEN: usize = 22;

/// Year printed as `00`.
pub const BASE_YEAR: i32 = 2000;

/// Last year the two-digit year field can print.
pub const MAX_YEAR: i32 = BASE_YEAR + 99;

/// Reasons a set of parts cannot be encoded as an [`Id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The prefix was empty.
    #[error("identifier prefix must not be empty")]
    EmptyPrefix,
    /// The sequence does not fit three digits.
    #[error("sequence {sequence} exceeds {max}", max = MAX_SEQUENCE)]
    SequenceOverflow {
        /// The rejected sequence.
        sequence: u16,
    },
    /// The instant falls on a leap second, which has no two-digit second.
    #[error("leap second instants cannot be encoded")]
    LeapSecond,
    /// The year is outside `2000..=2099`.
    #[error("year {year} outside {min}..={max}", min = BASE_YEAR, max = MAX_YEAR)]
    YearOutOfRange {
        /// The rejected year.
        year: i32,
    },
}

/// Reasons a string fails to decode as an [`Id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input was empty.
    #[error("empty identifier")]
    Empty,
    /// The input cannot hold a one-character prefix plus the digit block.
    #[error("identifier too short: {len} bytes")]
    TooShort {
        /// Length of the input in bytes.
        len: usize,
    },
    /// A byte of the trailing digit block is not an ASCII digit.
    #[error("non-digit at byte {index}")]
    NonDigit {
        /// Byte offset of the offending character.
        index: usize,
    },
    /// Month outside `1..=12`.
    #[error("invalid month: {month}")]
    InvalidMonth {
        /// The decoded month.
        month: u32,
    },
    /// Day not on the calendar for the decoded month and year.
    #[error("invalid day {day} for {year:04}-{month:02}")]
    InvalidDay {
        /// The decoded year.
        year: i32,
        /// The decoded month.
        month: u32,
        /// The decoded day.
        day: u32,
    },
    /// Hour outside `0..=23`.
    #[error("invalid hour: {hour}")]
    InvalidHour {
        /// The decoded hour.
        hour: u32,
    },
    /// Minute outside `0..=59`.
    #[error("invalid minute: {minute}")]
    InvalidMinute {
        /// The decoded minute.
        minute: u32,
    },
    /// Second outside `0..=59`.
    #[error("invalid second: {second}")]
    InvalidSecond {
        /// The decoded second.
        second: u32,
    },
}

/// Converts milliseconds since the UNIX epoch to a UTC instant.
///
/// Values past chrono's range clamp to its maximum.
#[must_use]
pub fn instant_from_millis(millis: u64) -> DateTime<Utc> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Builds an [`Id`] from its parts.
///
/// `generated_at` is truncated to millisecond precision.
///
/// # Errors
///
/// Returns an [`EncodeError`] if the parts cannot print as a prefix followed
/// by 22 digits that decode back to the same record: an empty prefix, a
/// sequence above [`MAX_SEQUENCE`], a leap second, or a year outside
/// `2000..=2099`.
///
/// # Example
///
/// ```
/// use stampid::{NodeId, encode, instant_from_millis};
///
/// let at = instant_from_millis(1_606_298_343_064);
/// let id = encode("ABC", at, NodeId::from_seed(3972), 247).unwrap();
/// assert_eq!(id.as_str(), "ABC2011250959030643972247");
/// ```
pub fn encode(
    prefix: &str,
    generated_at: DateTime<Utc>,
    node: NodeId,
    sequence: u16,
) -> Result<Id, EncodeError> {
    if prefix.is_empty() {
        return Err(EncodeError::EmptyPrefix);
    }
    if sequence > MAX_SEQUENCE {
        return Err(EncodeError::SequenceOverflow { sequence });
    }
    // chrono stores a leap second as a nanosecond field of one second or more.
    if generated_at.nanosecond() >= 1_000_000_000 {
        return Err(EncodeError::LeapSecond);
    }
    let year = generated_at.year();
    if !(BASE_YEAR..=MAX_YEAR).contains(&year) {
        return Err(EncodeError::YearOutOfRange { year });
    }

    let millis = generated_at.timestamp_subsec_millis();
    let generated_at = generated_at
        .with_nanosecond(millis * 1_000_000)
        .unwrap_or(generated_at);

    let mut text = String::with_capacity(prefix.len() + SUFFIX_LEN);
    text.push_str(prefix);
    // Writing into a `String` cannot fail.
    let _ = write!(
        text,
        "{:02}{:02}{:02}{:02}{:02}{:02}{:03}{:04}{:03}",
        year - BASE_YEAR,
        generated_at.month(),
        generated_at.day(),
        generated_at.hour(),
        generated_at.minute(),
        generated_at.second(),
        millis,
        node.get(),
        sequence,
    );

    Ok(Id {
        text,
        prefix_len: prefix.len(),
        generated_at,
        node,
        sequence,
    })
}

fn number(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

/// Decodes the textual form of an identifier.
///
/// Everything before the final 22 characters is the prefix, which must be at
/// least one character. The millisecond, node, and sequence fields accept any
/// numeral of their width.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the first check that failed: emptiness,
/// length, digits, then month, day, hour, minute, and second in that order.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn decode(text: &str) -> Result<Id, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let len = text.len();
    if len <= SUFFIX_LEN {
        return Err(ParseError::TooShort { len });
    }

    let prefix_len = len - SUFFIX_LEN;
    let digits = &text.as_bytes()[prefix_len..];
    if let Some(i) = digits.iter().position(|b| !b.is_ascii_digit()) {
        return Err(ParseError::NonDigit {
            index: prefix_len + i,
        });
    }

    let year = BASE_YEAR + number(&digits[0..2]) as i32;
    let month = number(&digits[2..4]);
    let day = number(&digits[4..6]);
    let hour = number(&digits[6..8]);
    let minute = number(&digits[8..10]);
    let second = number(&digits[10..12]);
    let millis = number(&digits[12..15]);
    let node = number(&digits[15..19]) as u16;
    let sequence = number(&digits[19..22]) as u16;

    if !(1..=12).contains(&month) {
        return Err(ParseError::InvalidMonth { month });
    }
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::InvalidDay { year, month, day })?;
    if hour > 23 {
        return Err(ParseError::InvalidHour { hour });
    }
    if minute > 59 {
        return Err(ParseError::InvalidMinute { minute });
    }
    if second > 59 {
        return Err(ParseError::InvalidSecond { second });
    }
    // Every field is in range, so the offset stays below one day.
    let since_midnight = ((hour * 60 + minute) * 60 + second) * 1_000 + millis;
    let time = NaiveTime::default() + TimeDelta::milliseconds(i64::from(since_midnight));

    Ok(Id {
        text: text.to_owned(),
        prefix_len,
        generated_at: date.and_time(time).and_utc(),
        node: NodeId::from_seed(u64::from(node)),
        sequence,
    })
}
