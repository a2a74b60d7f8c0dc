//! Serialization helpers
use gnss::prelude::SV;
use hifitime::{Duration, Epoch, Unit};
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub(crate) fn iso8601<S>(t: &Epoch, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&crate::time::iso8601(*t))
}

pub(crate) fn sv<S>(sv: &SV, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_str(sv)
}

pub(crate) fn sv_list<'de, D>(deserializer: D) -> Result<Vec<SV>, D::Error>
where
    D: Deserializer<'de>,
{
    let descriptors = Vec::<String>::deserialize(deserializer)?;
    descriptors
        .iter()
        .map(|desc| {
            let trimmed = desc.trim();
            if trimmed.len() < 2 || !trimmed.is_ascii() {
                return Err(serde::de::Error::custom(format!("invalid satellite \"{}\"", desc)));
            }
            SV::from_str(trimmed)
                .map_err(|e| serde::de::Error::custom(format!("\"{}\": {}", desc, e)))
        })
        .collect()
}

pub(crate) fn seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    if seconds > 0.0 {
        Ok(seconds * Unit::Second)
    } else {
        Err(serde::de::Error::custom("sampling interval must be positive"))
    }
}
