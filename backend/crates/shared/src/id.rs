//! Common ID Types
//!
//! Type-safe wrappers around the integer primary keys used by the CMS tables.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type PageId = Id<markers::Page>;
/// let id: PageId = Id::new(7);
/// assert_eq!(id.value(), 7);
/// ```
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Wrap a raw database key
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the raw database key
    pub const fn value(&self) -> i64 {
        self.value
    }
}

// Manual impls so that the marker type does not need to implement anything.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T> From<Id<T>> for i64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

/// Error when an id cannot be read from text (path segments, form fields)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid id: {0:?}")]
pub struct IdParseError(pub String);

impl<T> FromStr for Id<T> {
    type Err = IdParseError;

    /// Only plain decimal digits are accepted; signs and whitespace are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdParseError(s.to_string()));
        }
        s.parse::<i64>()
            .map(Self::new)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for Page IDs
    pub struct Page;

    /// Marker for PagePart IDs
    pub struct PagePart;

    /// Marker for Tag IDs
    pub struct Tag;

    /// Marker for Layout IDs
    pub struct Layout;

    /// Marker for User IDs
    pub struct User;
}

/// Type aliases for common IDs
pub type PageId = Id<markers::Page>;
pub type PagePartId = Id<markers::PagePart>;
pub type TagId = Id<markers::Tag>;
pub type LayoutId = Id<markers::Layout>;
pub type UserId = Id<markers::User>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_digits_only() {
        assert_eq!("42".parse::<PageId>(), Ok(PageId::new(42)));
        assert!("".parse::<PageId>().is_err());
        assert!("-1".parse::<PageId>().is_err());
        assert!("4a".parse::<PageId>().is_err());
        assert!(" 4".parse::<PageId>().is_err());
    }

    #[test]
    fn test_id_ordering_and_display() {
        let a = PageId::new(1);
        let b = PageId::new(2);
        assert!(a < b);
        assert_eq!(b.to_string(), "2");
        assert_eq!(format!("{:?}", a), "Id(1)");
    }

    #[test]
    fn test_id_serde_as_number() {
        let json = serde_json::to_string(&PagePartId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: PagePartId = serde_json::from_str("9").unwrap();
        assert_eq!(back.value(), 9);
    }
}
