// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(LogId);
entity_id!(SessionTypeId);
entity_id!(ContactId);
entity_id!(ProjectId);
entity_id!(MeetingId);
entity_id!(ClubId);

const NEW_ROW_MARKER: &str = "new";

/// Identity of an agenda row. Rows the server has not seen yet travel as the
/// `"new"` sentinel; locally they are told apart by a per-table counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    Saved(LogId),
    New(u32),
}

impl RowKey {
    pub const fn log_id(self) -> Option<LogId> {
        match self {
            Self::Saved(id) => Some(id),
            Self::New(_) => None,
        }
    }

    pub const fn is_new(self) -> bool {
        matches!(self, Self::New(_))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved(id) => write!(f, "{}", id.get()),
            Self::New(slot) => write!(f, "{NEW_ROW_MARKER}#{slot}"),
        }
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Saved(id) => serializer.serialize_i64(id.get()),
            Self::New(_) => serializer.serialize_str(NEW_ROW_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for RowKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowKeyVisitor;

        impl Visitor<'_> for RowKeyVisitor {
            type Value = RowKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a row id or the string \"new\"")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RowKey, E> {
                Ok(RowKey::Saved(LogId::new(value)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RowKey, E> {
                i64::try_from(value)
                    .map(|value| RowKey::Saved(LogId::new(value)))
                    .map_err(|_| E::custom(format!("row id {value} out of range")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RowKey, E> {
                if value == NEW_ROW_MARKER {
                    return Ok(RowKey::New(0));
                }
                value
                    .parse::<i64>()
                    .map(|value| RowKey::Saved(LogId::new(value)))
                    .map_err(|_| E::custom(format!("invalid row id {value:?}")))
            }
        }

        deserializer.deserialize_any(RowKeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogId, RowKey};
    use anyhow::Result;

    #[test]
    fn row_key_reads_numbers_numeric_strings_and_new_marker() -> Result<()> {
        let keys: Vec<RowKey> = serde_json::from_str(r#"[7, "12", "new"]"#)?;
        assert_eq!(
            keys,
            vec![
                RowKey::Saved(LogId::new(7)),
                RowKey::Saved(LogId::new(12)),
                RowKey::New(0),
            ]
        );
        Ok(())
    }

    #[test]
    fn new_rows_serialize_as_marker_regardless_of_slot() -> Result<()> {
        assert_eq!(serde_json::to_string(&RowKey::New(3))?, r#""new""#);
        assert_eq!(serde_json::to_string(&RowKey::Saved(LogId::new(9)))?, "9");
        Ok(())
    }

    #[test]
    fn invalid_row_id_is_rejected() {
        let error = serde_json::from_str::<RowKey>(r#""abc""#).expect_err("should fail");
        assert!(error.to_string().contains("invalid row id"));
    }
}
