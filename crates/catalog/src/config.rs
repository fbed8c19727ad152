use serde::{Deserialize, Serialize};

/// Strategy category list (TOML).
///
/// Example `config/catalog.toml`:
/// ```toml
/// [[category]]
/// label = "Trend"
/// key = "trend"
///
/// [[category]]
/// label = "Reversal"
/// key = "reversal"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(rename = "category")]
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryConfig {
    /// Label shown to subscribers in the category menu.
    pub label: String,
    /// Key the source fetches the category under.
    pub key: String,
}

impl CatalogConfig {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read catalog config at '{path}': {e}")
        });
        toml::from_str(&content).unwrap_or_else(|e| {
            panic!("Failed to parse catalog config at '{path}': {e}")
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.label.as_str()).collect()
    }

    /// Exact-match a menu input against the category labels.
    pub fn find(&self, input: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.label == input)
    }
}
