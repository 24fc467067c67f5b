//! Common serde helpers for handling null values from SurrealDB
//!
//! Record ids appear in two shapes: "table:id" strings (API JSON) and
//! SurrealDB's native RecordId form (straight from the database). The id
//! helpers accept both and normalize to the string form.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use surrealdb::RecordId;

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize bool that treats null as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

pub fn default_true() -> bool {
    true
}

/// Accepts either a "table:id" string or a native RecordId
#[derive(Debug, Clone)]
struct FlexibleId(String);

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexibleVisitor;

        impl<'de> Visitor<'de> for FlexibleVisitor {
            type Value = FlexibleId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string 'table:id' or RecordId")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value.to_string()))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(|id| FlexibleId(id.to_string()))
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// Required record id as "table:id" string
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &String, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(id)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        FlexibleId::deserialize(d).map(|f| f.0)
    }
}

/// Option<String> record id, null-tolerant
pub mod flexible_id {
    use super::*;

    pub fn serialize<S>(id: &Option<String>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(id),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleId>::deserialize(d).map(|opt| opt.map(|f| f.0))
    }
}
