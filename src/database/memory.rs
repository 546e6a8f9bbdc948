//! In-process [`ContentStore`] for tests and `--memory` runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::{
    new_id, now, Collection, ContentStore, Destination, DestinationDraft, Package, PackageDraft,
    StoreError,
};

/// Rows keyed by id, each tagged with its insertion sequence so equal
/// `display_order` and `created_at` still list in insertion order.
type Table<T> = RwLock<HashMap<String, (u64, T)>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    destinations: Table<Destination>,
    packages: Table<Package>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Shared listing for both tables.
fn sorted<T: Clone>(
    table: &Table<T>,
    include: impl Fn(&T) -> bool,
    key: impl Fn(&T) -> (i32, chrono::DateTime<chrono::Utc>),
) -> Vec<T> {
    let map = table.read().unwrap_or_else(PoisonError::into_inner);
    let mut rows: Vec<&(u64, T)> = map.values().filter(|(_, row)| include(row)).collect();
    rows.sort_by_key(|(seq, row)| {
        let (order, created) = key(row);
        (order, created, *seq)
    });
    rows.into_iter().map(|(_, row)| row.clone()).collect()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_destinations(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<Destination>, StoreError> {
        Ok(sorted(
            &self.destinations,
            |d| include_inactive || d.active,
            |d| (d.display_order, d.created_at),
        ))
    }

    async fn get_destination(&self, id: &str) -> Result<Destination, StoreError> {
        let map = self.destinations.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id)
            .map(|(_, row)| row.clone())
            .ok_or(StoreError::NotFound(Collection::Destinations))
    }

    async fn create_destination(&self, draft: DestinationDraft) -> Result<Destination, StoreError> {
        let row = draft.into_destination(new_id(), now());
        let seq = self.next_seq();
        self.destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(row.id.clone(), (seq, row.clone()));
        Ok(row)
    }

    async fn update_destination(
        &self,
        id: &str,
        draft: DestinationDraft,
    ) -> Result<Destination, StoreError> {
        let mut map = self.destinations.write().unwrap_or_else(PoisonError::into_inner);
        let (_, row) = map
            .get_mut(id)
            .ok_or(StoreError::NotFound(Collection::Destinations))?;
        let created_at = row.created_at;
        let mut updated = draft.into_destination(row.id.clone(), now());
        updated.created_at = created_at;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete_destination(&self, id: &str) -> Result<(), StoreError> {
        self.destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        Ok(())
    }

    async fn list_packages(&self, include_inactive: bool) -> Result<Vec<Package>, StoreError> {
        Ok(sorted(
            &self.packages,
            |p| include_inactive || p.active,
            |p| (p.display_order, p.created_at),
        ))
    }

    async fn get_package(&self, id: &str) -> Result<Package, StoreError> {
        let map = self.packages.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id)
            .map(|(_, row)| row.clone())
            .ok_or(StoreError::NotFound(Collection::Packages))
    }

    async fn create_package(&self, draft: PackageDraft) -> Result<Package, StoreError> {
        let row = draft.into_package(new_id(), now());
        let seq = self.next_seq();
        self.packages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(row.id.clone(), (seq, row.clone()));
        Ok(row)
    }

    async fn update_package(&self, id: &str, draft: PackageDraft) -> Result<Package, StoreError> {
        let mut map = self.packages.write().unwrap_or_else(PoisonError::into_inner);
        let (_, row) = map
            .get_mut(id)
            .ok_or(StoreError::NotFound(Collection::Packages))?;
        let created_at = row.created_at;
        let mut updated = draft.into_package(row.id.clone(), now());
        updated.created_at = created_at;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete_package(&self, id: &str) -> Result<(), StoreError> {
        self.packages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        Ok(())
    }
}
