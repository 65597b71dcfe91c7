//! Favorite channels, kept as an ordered list of ids

use crate::catalog::ChannelCatalog;
use crate::error::Result;
use crate::models::ChannelRecord;
use crate::storage::Storage;

pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesStore {
    ids: Vec<String>,
}

impl FavoritesStore {
    /// Read persisted ids; a corrupt value yields no favorites
    pub fn load(storage: &dyn Storage) -> Self {
        let ids = storage
            .get(FAVORITES_KEY)
            .and_then(|json| match serde_json::from_str::<Vec<String>>(&json) {
                Ok(ids) => Some(ids),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring corrupt favorites");
                    None
                }
            })
            .unwrap_or_default();

        Self { ids }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<()> {
        storage.set(FAVORITES_KEY, &serde_json::to_string(&self.ids)?)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.iter().any(|f| f == id)
    }

    /// Add or remove `id`; returns true when it is now a favorite
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|f| f == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Favorite records in favorites order; ids missing from the catalog are skipped
    pub fn resolve<'a>(&self, catalog: &'a ChannelCatalog) -> Vec<&'a ChannelRecord> {
        self.ids.iter().filter_map(|id| catalog.get_by_id(id)).collect()
    }
}
