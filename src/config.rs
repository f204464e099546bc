use color_eyre::Result;
use std::env::var;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialOrd, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub admin_key: String,
    pub bind_addr: String,
    pub storage_root: PathBuf,
    pub storage_disk: String,
    pub public_storage_url: String,
    pub max_upload_kb: u64,
}

impl Config {
    pub fn new() -> Result<Config> {
        let database_url = var("DATABASE_URL")?;
        let admin_key = var("SECRET")?;
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let storage_root = var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("storage/app/public"));
        let storage_disk = var("STORAGE_DISK").unwrap_or_else(|_| "public".to_string());
        let public_storage_url =
            var("PUBLIC_STORAGE_URL").unwrap_or_else(|_| "http://localhost:8000/storage".to_string());
        let max_upload_kb = match var("MAX_UPLOAD_KB") {
            Ok(kb) => kb.parse::<u64>()?,
            Err(_) => 4096,
        };

        Ok(Config {
            database_url,
            admin_key,
            bind_addr,
            storage_root,
            storage_disk,
            public_storage_url,
            max_upload_kb,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn admin_key(&self) -> &str {
        &self.admin_key
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn storage_disk(&self) -> &str {
        &self.storage_disk
    }

    pub fn public_storage_url(&self) -> &str {
        &self.public_storage_url
    }

    pub fn max_upload_kb(&self) -> u64 {
        self.max_upload_kb
    }

    /// Request body cap. News forms carry several images at once.
    pub fn body_limit(&self) -> usize {
        let bytes = self
            .max_upload_kb
            .saturating_mul(8)
            .saturating_add(1024)
            .saturating_mul(1024);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}
