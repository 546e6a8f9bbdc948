//! Packages table
//!
//! All-inclusive offers listed under "Our Travel Packages". Only the name
//! and price are mandatory; descriptions, duration and image may be empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use super::{
    check_fields, lenient_i32, lenient_string, DraftError, COUNT_MAX,
    DESCRIPTION_MAX, IMAGE_MAX, NAME_MAX, PRICE_MAX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Package {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub days: String,
    pub nights: String,
    pub price: String,
    pub image: String,
    pub active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageDraft {
    pub name_en: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub days: String,
    pub nights: String,
    pub price: String,
    pub image: String,
    pub active: bool,
    pub display_order: i32,
}

impl PackageDraft {
    fn required(&self) -> [(&'static str, &str); 3] {
        [
            ("name_en", &self.name_en),
            ("name_ar", &self.name_ar),
            ("price", &self.price),
        ]
    }

    fn limits(&self) -> [(&'static str, &str, usize); 8] {
        [
            ("name_en", &self.name_en, NAME_MAX),
            ("name_ar", &self.name_ar, NAME_MAX),
            ("description_en", &self.description_en, DESCRIPTION_MAX),
            ("description_ar", &self.description_ar, DESCRIPTION_MAX),
            ("days", &self.days, COUNT_MAX),
            ("nights", &self.nights, COUNT_MAX),
            ("price", &self.price, PRICE_MAX),
            ("image", &self.image, IMAGE_MAX),
        ]
    }


    pub fn check(self) -> Result<Self, DraftError> {
        check_fields(self.required(), self.limits())?;
        Ok(self)
    }

    pub fn into_package(self, id: String, now: DateTime<Utc>) -> Package {
        Package {
            id,
            name_en: self.name_en,
            name_ar: self.name_ar,
            description_en: self.description_en,
            description_ar: self.description_ar,
            days: self.days,
            nights: self.nights,
            price: self.price,
            image: self.image,
            active: self.active,
            display_order: self.display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Package> for PackageDraft {
    fn from(p: &Package) -> Self {
        Self {
            name_en: p.name_en.clone(),
            name_ar: p.name_ar.clone(),
            description_en: p.description_en.clone(),
            description_ar: p.description_ar.clone(),
            days: p.days.clone(),
            nights: p.nights.clone(),
            price: p.price.clone(),
            image: p.image.clone(),
            active: p.active,
            display_order: p.display_order,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub days: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nights: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub display_order: Option<i32>,
}

impl PackageInput {
    pub fn into_new_draft(self) -> Result<PackageDraft, DraftError> {
        PackageDraft {
            name_en: self.name_en.unwrap_or_default(),
            name_ar: self.name_ar.unwrap_or_default(),
            description_en: self.description_en.unwrap_or_default(),
            description_ar: self.description_ar.unwrap_or_default(),
            days: self.days.unwrap_or_default(),
            nights: self.nights.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            active: self.active.unwrap_or(true),
            display_order: self.display_order.unwrap_or(0),
        }
        .check()
    }

    /// Overlay the provided fields on `current`.
    pub fn merge_into(self, current: &Package) -> Result<PackageDraft, DraftError> {
        let mut draft = PackageDraft::from(current);
        let texts = [
            (&mut draft.name_en, self.name_en),
            (&mut draft.name_ar, self.name_ar),
            (&mut draft.description_en, self.description_en),
            (&mut draft.description_ar, self.description_ar),
            (&mut draft.days, self.days),
            (&mut draft.nights, self.nights),
            (&mut draft.price, self.price),
            (&mut draft.image, self.image),
        ];
        for (slot, value) in texts {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(active) = self.active {
            draft.active = active;
        }
        if let Some(order) = self.display_order {
            draft.display_order = order;
        }
        draft.check()
    }
}

// ============================================
// Queries
// ============================================

pub async fn list(pool: &MySqlPool, include_inactive: bool) -> Result<Vec<Package>, sqlx::Error> {
    sqlx::query_as::<_, Package>(
        "SELECT id, name_en, name_ar, description_en, description_ar, days, nights, \
         price, image, active, display_order, created_at, updated_at \
         FROM packages \
         WHERE active = TRUE OR ? \
         ORDER BY display_order ASC, created_at ASC",
    )
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn fetch(pool: &MySqlPool, id: &str) -> Result<Option<Package>, sqlx::Error> {
    sqlx::query_as::<_, Package>(
        "SELECT id, name_en, name_ar, description_en, description_ar, days, nights, \
         price, image, active, display_order, created_at, updated_at \
         FROM packages WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &MySqlPool, p: &Package) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO packages \
         (id, name_en, name_ar, description_en, description_ar, days, nights, \
          price, image, active, display_order, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&p.id)
    .bind(&p.name_en)
    .bind(&p.name_ar)
    .bind(&p.description_en)
    .bind(&p.description_ar)
    .bind(&p.days)
    .bind(&p.nights)
    .bind(&p.price)
    .bind(&p.image)
    .bind(p.active)
    .bind(p.display_order)
    .bind(p.created_at)
    .bind(p.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &MySqlPool,
    id: &str,
    draft: &PackageDraft,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE packages SET \
         name_en = ?, name_ar = ?, description_en = ?, description_ar = ?, \
         days = ?, nights = ?, price = ?, image = ?, active = ?, \
         display_order = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&draft.name_en)
    .bind(&draft.name_ar)
    .bind(&draft.description_en)
    .bind(&draft.description_ar)
    .bind(&draft.days)
    .bind(&draft.nights)
    .bind(&draft.price)
    .bind(&draft.image)
    .bind(draft.active)
    .bind(draft.display_order)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &MySqlPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM packages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_empty() {
        let input: PackageInput =
            serde_json::from_str(r#"{"name_en": "Umrah", "name_ar": "عمرة", "price": 950}"#).unwrap();
        let draft = input.into_new_draft().unwrap();
        assert!(draft.active);
        assert_eq!(draft.display_order, 0);
        assert_eq!(draft.price, "950");
        assert_eq!(draft.description_en, "");
        assert_eq!(draft.image, "");
    }

    #[test]
    fn test_created_hidden_when_asked() {
        let input: PackageInput = serde_json::from_str(
            r#"{"name_en": "Umrah", "name_ar": "عمرة", "price": "$950", "active": false}"#,
        )
        .unwrap();
        assert!(!input.into_new_draft().unwrap().active);
    }

    #[test]
    fn test_missing_price() {
        let input: PackageInput =
            serde_json::from_str(r#"{"name_en": "Umrah", "name_ar": "عمرة"}"#).unwrap();
        assert_eq!(
            input.into_new_draft().unwrap_err(),
            DraftError::Missing(vec!["price"])
        );
    }

    #[test]
    fn test_long_image_path_rejected() {
        let mut input: PackageInput =
            serde_json::from_str(r#"{"name_en": "Umrah", "name_ar": "عمرة", "price": "$950"}"#).unwrap();
        input.image = Some(format!("/images/{}", "a".repeat(IMAGE_MAX)));
        assert_eq!(
            input.into_new_draft().unwrap_err(),
            DraftError::TooLong(vec!["image"])
        );
    }

    #[test]
    fn test_merge_clears_optional_field() {
        let current = PackageDraft {
            name_en: "Umrah".into(),
            name_ar: "عمرة".into(),
            description_en: "Fourteen nights".into(),
            price: "$950".into(),
            active: true,
            ..Default::default()
        }
        .into_package("p1".into(), Utc::now());
        let patch: PackageInput =
            serde_json::from_str(r#"{"description_en": "", "display_order": 2}"#).unwrap();
        let draft = patch.merge_into(&current).unwrap();
        assert_eq!(draft.description_en, "");
        assert_eq!(draft.display_order, 2);
        assert_eq!(draft.name_en, "Umrah");
    }
}
