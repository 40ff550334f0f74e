use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Id, codec};

/// Serializes an identifier as its textual form.
impl Serialize for Id {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.as_str())
    }
}

/// Deserializes an identifier from its textual form, rejecting malformed
/// text with the decoder's reason.
impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl de::Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a prefixed identifier followed by 22 digits")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                codec::decode(v).map_err(E::custom)
            }
        }

        d.deserialize_str(IdVisitor)
    }
}
