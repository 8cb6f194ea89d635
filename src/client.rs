//! HTTP-backed schema catalog.
//!
//! Talks to the remote metadata endpoints (`metadata/entities`,
//! `metadata/enums`). Requires the `remote` feature (enabled by default).
//! Callers impose timeouts here at the transport boundary; the engine
//! itself never blocks.

use std::time::Duration;

use crate::catalog::SchemaCatalog;
use crate::error::CatalogError;
use crate::schema::{EntityType, EnumType};

/// Default timeout for metadata requests (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog served over HTTP by a remote metadata endpoint.
pub struct HttpCatalog {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    /// Build a catalog client for `base_url`; a trailing slash is
    /// tolerated. `token` is sent as a bearer token when present.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Network` if the underlying client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, CatalogError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| CatalogError::Network {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// GET `path` and decode the JSON body.
    ///
    /// When `missing` is set, a 404 response maps to
    /// `CatalogError::NotFound` for that name; every other failure is a
    /// transport error.
    fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        missing: Option<&str>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|source| CatalogError::Network {
            url: url.clone(),
            source,
        })?;

        if let Some(name) = missing {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(CatalogError::NotFound {
                    name: name.to_string(),
                });
            }
        }

        let response = response
            .error_for_status()
            .map_err(|source| CatalogError::Network {
                url: url.clone(),
                source,
            })?;

        response.json().map_err(|source| CatalogError::Network {
            url: url.clone(),
            source,
        })
    }
}

impl SchemaCatalog for HttpCatalog {
    fn list_entity_types(&self) -> Result<Vec<EntityType>, CatalogError> {
        self.fetch("metadata/entities", None)
    }

    fn get_entity_type(&self, name: &str) -> Result<EntityType, CatalogError> {
        self.fetch(&format!("metadata/entities/{name}"), Some(name))
    }

    fn list_enum_types(&self) -> Result<Vec<EnumType>, CatalogError> {
        self.fetch("metadata/enums", None)
    }

    fn get_enum_type(&self, name: &str) -> Result<EnumType, CatalogError> {
        self.fetch(&format!("metadata/enums/{name}"), Some(name))
    }
}
