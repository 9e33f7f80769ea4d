//! In-memory crop catalog
//!
//! Loaded once at startup from the seed data. Lookup only; the catalog is
//! immutable for the lifetime of the process.

use cdis_common::types::{CropCatalogEntry, Season};
use cdis_common::{Error, Result};
use std::collections::BTreeMap;
use tracing::warn;

pub struct CropCatalog {
    crops: Vec<CropCatalogEntry>,
}

impl CropCatalog {
    /// Build from seed entries, dropping any that fail validation
    pub fn new(entries: Vec<CropCatalogEntry>) -> Self {
        let mut crops = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_valid() {
                crops.push(entry);
            } else {
                warn!(crop_id = entry.id, name = %entry.name, "dropping invalid catalog entry");
            }
        }
        crops.sort_by_key(|c| c.id);
        Self { crops }
    }

    pub fn from_seed() -> Self {
        Self::new(crate::data::seed_crops())
    }

    pub fn all(&self) -> &[CropCatalogEntry] {
        &self.crops
    }

    pub fn get(&self, id: u32) -> Option<&CropCatalogEntry> {
        self.crops.iter().find(|c| c.id == id)
    }

    /// Resolve a set of ids, failing on the first unknown one
    pub fn by_ids(&self, ids: &[u32]) -> Result<Vec<&CropCatalogEntry>> {
        ids.iter()
            .map(|id| {
                self.get(*id)
                    .ok_or_else(|| Error::NotFound(format!("unknown crop id {id}")))
            })
            .collect()
    }

    /// Crops growable in the given season (year-round crops always qualify)
    pub fn by_season(&self, season: Season) -> Vec<&CropCatalogEntry> {
        self.crops
            .iter()
            .filter(|c| c.grows_in(season) || c.is_annual())
            .collect()
    }

    /// Case-insensitive name lookup for the fast-path analyzer
    pub fn by_name(&self, name: &str) -> Option<&CropCatalogEntry> {
        let needle = name.trim().to_lowercase();
        self.crops.iter().find(|c| {
            let n = c.name.to_lowercase();
            n == needle || n.starts_with(&needle) || needle.starts_with(&n)
        })
    }

    /// Crop id (string form) → display name
    pub fn name_map(&self, ids: &[u32]) -> BTreeMap<String, String> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|c| (c.id.to_string(), c.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_and_name() {
        let catalog = CropCatalog::from_seed();
        assert_eq!(catalog.get(1).map(|c| c.name.as_str()), Some("Soybean"));
        assert!(catalog.get(9999).is_none());
        assert_eq!(catalog.by_name("soybean").map(|c| c.id), Some(1));
        assert_eq!(catalog.by_name("Rice").map(|c| c.id), Some(2));
    }

    #[test]
    fn by_ids_fails_on_unknown() {
        let catalog = CropCatalog::from_seed();
        assert!(catalog.by_ids(&[1, 2, 3]).is_ok());
        let err = catalog.by_ids(&[1, 9999]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn annual_crops_qualify_in_every_season() {
        let catalog = CropCatalog::from_seed();
        for season in [Season::Kharif, Season::Rabi, Season::Zaid] {
            assert!(
                catalog.by_season(season).iter().any(|c| c.is_annual()),
                "no annual crop surfaced for {season}"
            );
        }
    }
}
