//! Serde helpers for rows coming back from the data service

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable column into `T`, mapping `null` to `T::default()`.
///
/// Use together with `#[serde(default)]` so that missing columns (partial
/// `select` lists) behave the same way as explicit nulls.
pub fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
