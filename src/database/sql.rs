//! MySQL-backed [`ContentStore`].

use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tracing::info;

use super::{
    destinations, new_id, now, packages, Collection, ContentStore, Destination, DestinationDraft,
    Package, PackageDraft, StoreError,
};
use crate::config::SiteConfig;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: MySqlPool,
}

impl SqlStore {
    pub async fn connect(config: &SiteConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.sql_max_connections)
            .connect(&config.database_url())
            .await?;
        info!(
            "[db] [connected] max_connections={}",
            config.sql_max_connections
        );
        Ok(Self { pool })
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(&self.pool).await?;
        info!("[db] [migrated]");
        Ok(())
    }
}

#[async_trait]
impl ContentStore for SqlStore {
    async fn list_destinations(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<Destination>, StoreError> {
        Ok(destinations::list(&self.pool, include_inactive).await?)
    }

    async fn get_destination(&self, id: &str) -> Result<Destination, StoreError> {
        destinations::fetch(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(Collection::Destinations))
    }

    async fn create_destination(&self, draft: DestinationDraft) -> Result<Destination, StoreError> {
        let row = draft.into_destination(new_id(), now());
        destinations::insert(&self.pool, &row).await?;
        Ok(row)
    }

    async fn update_destination(
        &self,
        id: &str,
        draft: DestinationDraft,
    ) -> Result<Destination, StoreError> {
        // rows_affected is 0 for an unchanged row, so re-read instead
        destinations::update(&self.pool, id, &draft, now()).await?;
        self.get_destination(id).await
    }

    async fn delete_destination(&self, id: &str) -> Result<(), StoreError> {
        destinations::delete(&self.pool, id).await?;
        Ok(())
    }

    async fn list_packages(&self, include_inactive: bool) -> Result<Vec<Package>, StoreError> {
        Ok(packages::list(&self.pool, include_inactive).await?)
    }

    async fn get_package(&self, id: &str) -> Result<Package, StoreError> {
        packages::fetch(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(Collection::Packages))
    }

    async fn create_package(&self, draft: PackageDraft) -> Result<Package, StoreError> {
        let row = draft.into_package(new_id(), now());
        packages::insert(&self.pool, &row).await?;
        Ok(row)
    }

    async fn update_package(&self, id: &str, draft: PackageDraft) -> Result<Package, StoreError> {
        packages::update(&self.pool, id, &draft, now()).await?;
        self.get_package(id).await
    }

    async fn delete_package(&self, id: &str) -> Result<(), StoreError> {
        packages::delete(&self.pool, id).await?;
        Ok(())
    }
}
