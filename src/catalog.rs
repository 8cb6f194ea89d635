//! Schema catalog access - the remote collaborator boundary, a snapshot
//! implementation, and the session cache.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ReconcileError};
use crate::schema::{EntityType, EnumType};

/// Source of canonical schema metadata.
///
/// `list_*` return the full catalog; `get_*` are targeted fetches for a
/// single name and fail with [`CatalogError::NotFound`] when the source
/// does not know it. Transport failures propagate unchanged with their own
/// classification.
pub trait SchemaCatalog {
    fn list_entity_types(&self) -> Result<Vec<EntityType>, CatalogError>;
    fn get_entity_type(&self, name: &str) -> Result<EntityType, CatalogError>;
    fn list_enum_types(&self) -> Result<Vec<EnumType>, CatalogError>;
    fn get_enum_type(&self, name: &str) -> Result<EnumType, CatalogError>;
}

/// Serialized catalog snapshot - the `pull` output format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub entities: Vec<EntityType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

/// Catalog backed by an in-memory snapshot, typically loaded from a file
/// produced by `metadrift pull`.
#[derive(Debug, Clone)]
pub struct SnapshotCatalog {
    snapshot: CatalogSnapshot,
}

impl SnapshotCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FileNotFound` if the file doesn't exist,
    /// `ReadError` on IO failure, or `InvalidJson` on malformed content.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content =
            std::fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot =
            serde_json::from_str(&content).map_err(|source| CatalogError::InvalidJson { source })?;
        Ok(Self::new(snapshot))
    }
}

impl SchemaCatalog for SnapshotCatalog {
    fn list_entity_types(&self) -> Result<Vec<EntityType>, CatalogError> {
        Ok(self.snapshot.entities.clone())
    }

    fn get_entity_type(&self, name: &str) -> Result<EntityType, CatalogError> {
        self.snapshot
            .entities
            .iter()
            .find(|t| t.entity_name == name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }

    fn list_enum_types(&self) -> Result<Vec<EnumType>, CatalogError> {
        Ok(self.snapshot.enums.clone())
    }

    fn get_enum_type(&self, name: &str) -> Result<EnumType, CatalogError> {
        self.snapshot
            .enums
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Session-scoped cache over a catalog.
///
/// The full catalog is fetched once per session on first use and kept for
/// the session's lifetime; lookups scan the cached snapshot and fall back
/// to a single targeted fetch on miss (tolerating catalogs that are
/// incomplete or types created after the bulk fetch). The populating fetch
/// runs while the cache lock is held, so concurrent callers wait on the
/// same fetch instead of issuing duplicates. Staleness within a session is
/// accepted; a fresh session starts with an empty cache.
pub struct Session<C> {
    catalog: C,
    entities: Mutex<Option<Vec<EntityType>>>,
    enums: Mutex<Option<Vec<EnumType>>>,
}

impl<C: SchemaCatalog> Session<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            entities: Mutex::new(None),
            enums: Mutex::new(None),
        }
    }

    /// Resolve the canonical entity descriptor for `name`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::MetaclassNotFound` when neither the cached
    /// catalog nor a targeted fetch knows the name; transport failures
    /// pass through as `ReconcileError::Catalog`.
    pub fn entity_type(&self, name: &str) -> Result<EntityType, ReconcileError> {
        let mut cache = self
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(self.catalog.list_entity_types()?);
        }
        if let Some(found) = cache
            .iter()
            .flatten()
            .find(|t| t.entity_name == name)
        {
            return Ok(found.clone());
        }
        drop(cache);

        match self.catalog.get_entity_type(name) {
            Ok(entity) => Ok(entity),
            Err(CatalogError::NotFound { .. }) => Err(ReconcileError::MetaclassNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the canonical enum descriptor for `name`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::EnumNotFound` when the name is unknown;
    /// transport failures pass through as `ReconcileError::Catalog`.
    pub fn enum_type(&self, name: &str) -> Result<EnumType, ReconcileError> {
        let mut cache = self.enums.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(self.catalog.list_enum_types()?);
        }
        if let Some(found) = cache.iter().flatten().find(|e| e.name == name) {
            return Ok(found.clone());
        }
        drop(cache);

        match self.catalog.get_enum_type(name) {
            Ok(e) => Ok(e),
            Err(CatalogError::NotFound { .. }) => Err(ReconcileError::EnumNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
