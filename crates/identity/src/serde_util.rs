use serde::{Deserialize, Deserializer};

/// Distinguishes an absent key from an explicit `null`.
///
/// With `#[serde(default)]` on the struct, a missing key stays `None`; this
/// maps a present key to `Some(...)`, so `Some(None)` means "submitted as
/// null". Update forms use it for fields where null clears and absence keeps.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
