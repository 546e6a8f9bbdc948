//! Content storage
//!
//! Two collections back the site: destinations and packages. Both live in
//! MySQL in production ([`SqlStore`]); [`MemoryStore`] keeps them in process
//! for tests and `--memory` development runs. Handlers only see the
//! [`ContentStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

pub mod destinations;
pub mod memory;
pub mod packages;
pub mod sql;

pub use destinations::{Destination, DestinationDraft, DestinationInput};
pub use memory::MemoryStore;
pub use packages::{Package, PackageDraft, PackageInput};
pub use sql::SqlStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Destinations,
    Packages,
}

impl Collection {
    /// Path segment and table name.
    pub fn slug(self) -> &'static str {
        match self {
            Collection::Destinations => "destinations",
            Collection::Packages => "packages",
        }
    }

    /// Capitalised singular, for messages like "Package not found".
    pub fn title(self) -> &'static str {
        match self {
            Collection::Destinations => "Destination",
            Collection::Packages => "Package",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "destinations" => Some(Collection::Destinations),
            "packages" => Some(Collection::Packages),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    /// Lowercase singular.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Destinations => f.write_str("destination"),
            Collection::Packages => f.write_str("package"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} not found", .0.title())]
    NotFound(Collection),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Why a draft can't be written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// Required fields left empty by a create or update.
    #[error("Missing required fields: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    /// Fields longer than their column allows.
    #[error("Fields too long: {}", .0.join(", "))]
    TooLong(Vec<&'static str>),
}

// Column widths in characters, matching migrations/0001_content.sql.
pub const NAME_MAX: usize = 255;
pub const COUNT_MAX: usize = 32;
pub const PRICE_MAX: usize = 64;
pub const IMAGE_MAX: usize = 512;
/// `TEXT` holds 65,535 bytes; utf8mb4 needs up to 4 per character.
pub const DESCRIPTION_MAX: usize = 65_535 / 4;

#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Destinations ordered by `display_order`; hidden rows only when
    /// `include_inactive` is set.
    async fn list_destinations(&self, include_inactive: bool)
        -> Result<Vec<Destination>, StoreError>;

    async fn get_destination(&self, id: &str) -> Result<Destination, StoreError>;

    async fn create_destination(&self, draft: DestinationDraft)
        -> Result<Destination, StoreError>;

    async fn update_destination(
        &self,
        id: &str,
        draft: DestinationDraft,
    ) -> Result<Destination, StoreError>;

    /// Deleting an id that doesn't exist is not an error.
    async fn delete_destination(&self, id: &str) -> Result<(), StoreError>;

    async fn list_packages(&self, include_inactive: bool) -> Result<Vec<Package>, StoreError>;

    async fn get_package(&self, id: &str) -> Result<Package, StoreError>;

    async fn create_package(&self, draft: PackageDraft) -> Result<Package, StoreError>;

    async fn update_package(&self, id: &str, draft: PackageDraft) -> Result<Package, StoreError>;

    async fn delete_package(&self, id: &str) -> Result<(), StoreError>;
}

/// Current time at the precision MySQL `DATETIME(6)` keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Collect the names of required fields whose value is blank.
pub(crate) fn blank_fields<'a, I>(fields: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = (&'static str, &'a str)>,
{
    fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
}

/// Collect the names of fields longer than their limit.
pub(crate) fn overlong_fields<'a, I>(fields: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = (&'static str, &'a str, usize)>,
{
    fields
        .into_iter()
        .filter(|(_, value, max)| value.chars().count() > *max)
        .map(|(name, _, _)| name)
        .collect()
}

/// Blank required fields first, then overlong ones.
pub(crate) fn check_fields<'a, R, L>(required: R, limits: L) -> Result<(), DraftError>
where
    R: IntoIterator<Item = (&'static str, &'a str)>,
    L: IntoIterator<Item = (&'static str, &'a str, usize)>,
{
    let missing = blank_fields(required);
    if !missing.is_empty() {
        return Err(DraftError::Missing(missing));
    }
    let overlong = overlong_fields(limits);
    if !overlong.is_empty() {
        return Err(DraftError::TooLong(overlong));
    }
    Ok(())
}

/// Scalars the admin forms and API clients send interchangeably.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// Accepts a JSON string or number for a text column.
pub(crate) fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(de)? {
        None => None,
        Some(Scalar::Str(s)) => Some(s),
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(n)) => Some(n.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
    })
}

/// Accepts `3`, `"3"` or `""` (treated as absent) for `display_order`.
pub(crate) fn lenient_i32<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Scalar>::deserialize(de)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => i32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom("display_order out of range")),
        Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom("display_order must be an integer")),
        Some(_) => Err(D::Error::custom("display_order must be an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_slugs() {
        assert_eq!(Collection::from_slug("packages"), Some(Collection::Packages));
        assert_eq!(Collection::from_slug("hotels"), None);
        assert_eq!(Collection::Destinations.to_string(), "destination");
        assert_eq!(
            StoreError::NotFound(Collection::Packages).to_string(),
            "Package not found"
        );
    }

    #[test]
    fn test_draft_error_messages() {
        let err = DraftError::Missing(vec!["name_en", "price"]);
        assert_eq!(err.to_string(), "Missing required fields: name_en, price");
        let err = DraftError::TooLong(vec!["days"]);
        assert_eq!(err.to_string(), "Fields too long: days");
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "x".repeat(COUNT_MAX);
        let over = "x".repeat(COUNT_MAX + 1);
        assert!(overlong_fields([("days", at_limit.as_str(), COUNT_MAX)]).is_empty());
        assert_eq!(overlong_fields([("days", over.as_str(), COUNT_MAX)]), vec!["days"]);
        // 32 Arabic letters fit a VARCHAR(32) column
        let arabic = "ع".repeat(COUNT_MAX);
        assert!(overlong_fields([("days", arabic.as_str(), COUNT_MAX)]).is_empty());
    }

    #[test]
    fn test_missing_reported_before_length() {
        let over = "x".repeat(NAME_MAX + 1);
        let err = check_fields([("price", "")], [("name_en", over.as_str(), NAME_MAX)]).unwrap_err();
        assert_eq!(err, DraftError::Missing(vec!["price"]));
    }

    #[test]
    fn test_blank_fields() {
        let blanks = blank_fields([("a", "x"), ("b", "  "), ("c", "")]);
        assert_eq!(blanks, vec!["b", "c"]);
    }
}
