use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Result of one catalog lookup, before best-effort degradation.
#[derive(Debug)]
pub enum CatalogLoad {
    Loaded { path: PathBuf, products: Vec<Value> },
    Missing,
    Failed(AppError),
}

/// Read-only access to the product catalog on disk.
///
/// Nothing is cached: every call goes back to the filesystem, so an edited
/// `products.json` is picked up by the next request.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    paths: Vec<PathBuf>,
}

impl CatalogRepository {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Only the first candidate that exists is read; a broken file there does
    /// not fall through to later candidates.
    pub async fn load(&self) -> CatalogLoad {
        let Some(path) = self.resolve().await else {
            return CatalogLoad::Missing;
        };

        match read_products(&path).await {
            Ok(products) => CatalogLoad::Loaded { path, products },
            Err(e) => CatalogLoad::Failed(e),
        }
    }

    /// Best-effort catalog: missing or unreadable files yield an empty list.
    pub async fn find_all(&self) -> Vec<Value> {
        match self.load().await {
            CatalogLoad::Loaded { path, products } => {
                debug!("Loaded {} products from {}", products.len(), path.display());
                products
            }
            CatalogLoad::Missing => {
                debug!("No catalog file found in {:?}", self.paths);
                Vec::new()
            }
            CatalogLoad::Failed(e) => {
                warn!("Error loading products: {e}");
                Vec::new()
            }
        }
    }

    /// Pretty-printed catalog for embedding into a prompt.
    pub async fn prompt_json(&self) -> String {
        let products = self.find_all().await;
        serde_json::to_string_pretty(&products).unwrap_or_else(|e| {
            warn!("Failed to serialize catalog: {e}");
            "[]".to_string()
        })
    }

    async fn resolve(&self) -> Option<PathBuf> {
        for path in &self.paths {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Some(path.clone());
            }
        }
        None
    }
}

async fn read_products(path: &Path) -> Result<Vec<Value>, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::CatalogRead { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| AppError::CatalogParse { path: path.to_path_buf(), source })
}
