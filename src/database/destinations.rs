//! Destinations table
//!
//! Featured trips shown in the "Popular Destinations" grid. Only the name
//! is bilingual; counts and price are display strings ("5", "$1,200").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use super::{
    check_fields, lenient_i32, lenient_string, DraftError, COUNT_MAX, IMAGE_MAX,
    NAME_MAX, PRICE_MAX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Destination {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub days: String,
    pub nights: String,
    pub people: String,
    pub price: String,
    pub image: String,
    pub active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable columns of a destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DestinationDraft {
    pub name_en: String,
    pub name_ar: String,
    pub days: String,
    pub nights: String,
    pub people: String,
    pub price: String,
    pub image: String,
    pub active: bool,
    pub display_order: i32,
}

impl DestinationDraft {
    fn required(&self) -> [(&'static str, &str); 7] {
        [
            ("name_en", &self.name_en),
            ("name_ar", &self.name_ar),
            ("days", &self.days),
            ("nights", &self.nights),
            ("people", &self.people),
            ("price", &self.price),
            ("image", &self.image),
        ]
    }


    fn limits(&self) -> [(&'static str, &str, usize); 7] {
        [
            ("name_en", &self.name_en, NAME_MAX),
            ("name_ar", &self.name_ar, NAME_MAX),
            ("days", &self.days, COUNT_MAX),
            ("nights", &self.nights, COUNT_MAX),
            ("people", &self.people, COUNT_MAX),
            ("price", &self.price, PRICE_MAX),
            ("image", &self.image, IMAGE_MAX),
        ]
    }

    pub fn check(self) -> Result<Self, DraftError> {
        check_fields(self.required(), self.limits())?;
        Ok(self)
    }

    pub fn into_destination(self, id: String, now: DateTime<Utc>) -> Destination {
        Destination {
            id,
            name_en: self.name_en,
            name_ar: self.name_ar,
            days: self.days,
            nights: self.nights,
            people: self.people,
            price: self.price,
            image: self.image,
            active: self.active,
            display_order: self.display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Destination> for DestinationDraft {
    fn from(d: &Destination) -> Self {
        Self {
            name_en: d.name_en.clone(),
            name_ar: d.name_ar.clone(),
            days: d.days.clone(),
            nights: d.nights.clone(),
            people: d.people.clone(),
            price: d.price.clone(),
            image: d.image.clone(),
            active: d.active,
            display_order: d.display_order,
        }
    }
}

/// JSON body of a create or update. Absent fields are `None`; unknown
/// fields such as `id` or `created_at` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub days: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nights: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub people: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub display_order: Option<i32>,
}

impl DestinationInput {
    /// A new destination always starts visible, whatever `active` says.
    pub fn into_new_draft(self) -> Result<DestinationDraft, DraftError> {
        DestinationDraft {
            name_en: self.name_en.unwrap_or_default(),
            name_ar: self.name_ar.unwrap_or_default(),
            days: self.days.unwrap_or_default(),
            nights: self.nights.unwrap_or_default(),
            people: self.people.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            active: true,
            display_order: self.display_order.unwrap_or(0),
        }
        .check()
    }

    /// Overlay the provided fields on `current`.
    pub fn merge_into(self, current: &Destination) -> Result<DestinationDraft, DraftError> {
        let mut draft = DestinationDraft::from(current);
        let texts = [
            (&mut draft.name_en, self.name_en),
            (&mut draft.name_ar, self.name_ar),
            (&mut draft.days, self.days),
            (&mut draft.nights, self.nights),
            (&mut draft.people, self.people),
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

pub async fn list(pool: &MySqlPool, include_inactive: bool) -> Result<Vec<Destination>, sqlx::Error> {
    sqlx::query_as::<_, Destination>(
        "SELECT id, name_en, name_ar, days, nights, people, price, image, \
         active, display_order, created_at, updated_at \
         FROM destinations \
         WHERE active = TRUE OR ? \
         ORDER BY display_order ASC, created_at ASC",
    )
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn fetch(pool: &MySqlPool, id: &str) -> Result<Option<Destination>, sqlx::Error> {
    sqlx::query_as::<_, Destination>(
        "SELECT id, name_en, name_ar, days, nights, people, price, image, \
         active, display_order, created_at, updated_at \
         FROM destinations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &MySqlPool, d: &Destination) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO destinations \
         (id, name_en, name_ar, days, nights, people, price, image, \
          active, display_order, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&d.id)
    .bind(&d.name_en)
    .bind(&d.name_ar)
    .bind(&d.days)
    .bind(&d.nights)
    .bind(&d.people)
    .bind(&d.price)
    .bind(&d.image)
    .bind(d.active)
    .bind(d.display_order)
    .bind(d.created_at)
    .bind(d.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Replace the editable columns of `id`. Returns the number of rows matched.
pub async fn update(
    pool: &MySqlPool,
    id: &str,
    draft: &DestinationDraft,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE destinations SET \
         name_en = ?, name_ar = ?, days = ?, nights = ?, people = ?, \
         price = ?, image = ?, active = ?, display_order = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&draft.name_en)
    .bind(&draft.name_ar)
    .bind(&draft.days)
    .bind(&draft.nights)
    .bind(&draft.people)
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
    let result = sqlx::query("DELETE FROM destinations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
