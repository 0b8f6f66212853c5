//! `YYYY-MM-DD` calendar dates on the wire.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use time::{macros::format_description, Date};

use crate::clock::format_date;

pub(crate) fn parse(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
}

pub(crate) fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_date(*date))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
    let raw = String::deserialize(d)?;
    parse(&raw).map_err(|e| D::Error::custom(format!("invalid date {raw:?}: {e}")))
}

/// Optional variant; empty strings read as `None`.
pub(crate) mod option {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&format_date(*d)),
            None => s.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse(&raw)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid date {raw:?}: {e}"))),
            _ => Ok(None),
        }
    }
}
