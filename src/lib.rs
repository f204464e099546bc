use crate::auth::{AdminKey, PrincipalProvider};
use crate::config::Config;
use crate::storage::{BlobStore, DiskStore};
use baladiya_core::MediaResolver;
use color_eyre::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod news;
pub mod pages;
pub mod routes;
pub mod schema;
pub mod storage;
pub mod upload;

pub struct AppState {
    pub database: DatabaseConnection,
    pub config: Config,
    pub media: MediaResolver,
    pub blobs: Arc<dyn BlobStore>,
    pub principals: Arc<dyn PrincipalProvider>,
}

impl AppState {
    /// Disk storage under the configured root, admin by shared secret.
    pub fn new(database: DatabaseConnection, config: Config) -> Result<AppState> {
        let media = MediaResolver::new(config.public_storage_url())?;
        let blobs = Arc::new(DiskStore::new(config.storage_root()));
        let principals = Arc::new(AdminKey::new(config.admin_key()));

        Ok(AppState {
            database,
            config,
            media,
            blobs,
            principals,
        })
    }

    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn with_principals(mut self, principals: Arc<dyn PrincipalProvider>) -> Self {
        self.principals = principals;
        self
    }
}
