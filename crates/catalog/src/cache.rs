use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::source::CatalogSource;

#[derive(Debug, Default)]
struct ResidentCategory {
    key: Option<String>,
    strategies: BTreeMap<String, String>,
}

/// Process-wide cache of the most recently selected strategy category.
///
/// There is no TTL: every category selection triggers a live fetch and
/// replaces the resident set wholesale. A fetch or parse failure installs
/// an empty set — never a stale one merged with errors — and is not
/// raised to the caller; the dialogue tells the subscriber to pick a
/// different category instead.
pub struct StrategyCatalog {
    source: Arc<dyn CatalogSource>,
    current: RwLock<ResidentCategory>,
}

impl StrategyCatalog {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            current: RwLock::new(ResidentCategory::default()),
        }
    }

    /// Live-load one category, replacing whatever was resident.
    ///
    /// Returns the loaded name → description map; empty on any failure.
    pub async fn load_category(&self, key: &str) -> BTreeMap<String, String> {
        let strategies = match self.source.fetch_category(key).await {
            Ok(rows) => {
                let total = rows.len();
                let map: BTreeMap<String, String> = rows
                    .into_iter()
                    .filter_map(|row| match (row.name, row.description) {
                        (Some(name), Some(desc)) if !name.trim().is_empty() => {
                            Some((name.trim().to_string(), desc))
                        }
                        _ => None,
                    })
                    .collect();
                info!(category = key, kept = map.len(), fetched = total, "Catalog category loaded");
                map
            }
            Err(e) => {
                warn!(category = key, error = %e, "Catalog fetch failed — category is empty");
                BTreeMap::new()
            }
        };

        let mut current = self.current.write().await;
        current.key = Some(key.to_string());
        current.strategies = strategies.clone();
        strategies
    }

    /// The resident strategy set (the last loaded category's).
    pub async fn strategies(&self) -> BTreeMap<String, String> {
        self.current.read().await.strategies.clone()
    }

    pub async fn current_category(&self) -> Option<String> {
        self.current.read().await.key.clone()
    }

    pub async fn description(&self, name: &str) -> Option<String> {
        self.current.read().await.strategies.get(name).cloned()
    }
}
