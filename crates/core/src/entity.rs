//! Entity trait: identity + continuity across state changes.

/// Minimal interface of a stored record.
///
/// Arena containers key records by `Id` and mint new ids from a counter,
/// hence the `From<u64>` / ordering bounds.
pub trait Entity {
    /// Strongly-typed record identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug + From<u64>;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;
}
