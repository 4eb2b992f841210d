//! Serde helpers shared by the wire types.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the service may send as `null`, treating
/// `null` the same as a missing key.
///
/// Pair with `#[serde(default)]` so an absent key also falls back.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
