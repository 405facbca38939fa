//! Named collection of catalogs with a "current" pointer for UI routing.

use crate::catalog::{Catalog, CatalogConfig};
use crate::error::{CatalogError, Result};
use std::collections::HashMap;

/// Owns every open catalog, keyed by cid, and tracks which one the UI
/// currently has selected. Creation order is preserved for listing.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    catalogs: HashMap<String, Catalog>,
    order: Vec<String>,
    current: Option<String>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        CatalogRegistry::default()
    }

    /// Create a catalog and make it current. Fails with `DuplicateId` when
    /// the cid is already registered.
    pub fn create_catalog(&mut self, cid: &str, config: CatalogConfig) -> Result<&mut Catalog> {
        if self.catalogs.contains_key(cid) {
            return Err(CatalogError::DuplicateId {
                cid: cid.to_string(),
            });
        }
        tracing::debug!(cid = %cid, "created catalog");
        self.catalogs.insert(cid.to_string(), Catalog::new(cid, config));
        self.order.push(cid.to_string());
        self.current = Some(cid.to_string());
        Ok(self.catalogs.get_mut(cid).expect("catalog was just inserted"))
    }

    /// Register an already-built catalog (e.g. loaded from disk).
    pub fn insert(&mut self, catalog: Catalog) -> Result<()> {
        let cid = catalog.cid().to_string();
        if self.catalogs.contains_key(&cid) {
            return Err(CatalogError::DuplicateId { cid });
        }
        self.order.push(cid.clone());
        self.catalogs.insert(cid, catalog);
        Ok(())
    }

    /// Drop a catalog, releasing its markers with it. Returns the catalog
    /// if it was present; clears the current pointer if it referenced it.
    pub fn remove_catalog(&mut self, cid: &str) -> Option<Catalog> {
        let removed = self.catalogs.remove(cid);
        if removed.is_some() {
            self.order.retain(|c| c != cid);
            if self.current.as_deref() == Some(cid) {
                self.current = None;
            }
            tracing::debug!(cid = %cid, "removed catalog");
        }
        removed
    }

    pub fn get(&self, cid: &str) -> Option<&Catalog> {
        self.catalogs.get(cid)
    }

    pub fn get_mut(&mut self, cid: &str) -> Option<&mut Catalog> {
        self.catalogs.get_mut(cid)
    }

    /// Point the "current" marker at a registered catalog.
    pub fn set_current(&mut self, cid: &str) -> Result<()> {
        if !self.catalogs.contains_key(cid) {
            return Err(CatalogError::not_found(format!("catalog '{}'", cid)));
        }
        self.current = Some(cid.to_string());
        Ok(())
    }

    /// The currently selected catalog; `None` when nothing is selected or
    /// the selection references a catalog that has since been removed.
    pub fn current(&self) -> Option<&Catalog> {
        self.current.as_deref().and_then(|cid| self.catalogs.get(cid))
    }

    pub fn current_mut(&mut self) -> Option<&mut Catalog> {
        let cid = self.current.clone()?;
        self.catalogs.get_mut(&cid)
    }

    /// Catalogs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Catalog> {
        self.order.iter().filter_map(move |cid| self.catalogs.get(cid))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
