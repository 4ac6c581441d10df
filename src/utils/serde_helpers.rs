use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Deserialize `null` as `T::default()`. Nodes emit `null` for empty lists and maps.
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Durations travel as integer nanoseconds.
pub fn duration_from_nanos<'de, D>(d: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let nanos = i64::deserialize(d)?;
    Ok(Duration::from_nanos(nanos.max(0) as u64))
}

pub fn duration_as_nanos<S>(v: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_i64(v.as_nanos().min(i64::MAX as u128) as i64)
}
