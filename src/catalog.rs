// 📡 Catalog Client - the only component that talks to the network
//
// Two endpoints:
//   GET {base}/pokemon?limit=N     -> { results: [{ name, url }] }
//   GET {base}/pokemon/{key}       -> detail (id, name, types, sprites)
//
// Every call flips the shared loading flag for its duration. Only
// `fetch_by_name_or_id` clears the shared error before it starts; the
// other calls leave whatever error is already showing.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{Pokemon, PokemonType};
use crate::status::SharedStatus;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

// ============================================================================
// LOOKUP KEY
// ============================================================================

/// Name or numeric id accepted by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokemonKey {
    Name(String),
    Id(u32),
}

impl PokemonKey {
    /// Lowercase string form sent to the catalog.
    pub fn normalized(&self) -> String {
        match self {
            PokemonKey::Name(name) => name.to_lowercase(),
            PokemonKey::Id(id) => id.to_string(),
        }
    }
}

impl fmt::Display for PokemonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl From<&str> for PokemonKey {
    fn from(name: &str) -> Self {
        PokemonKey::Name(name.to_string())
    }
}

impl From<String> for PokemonKey {
    fn from(name: String) -> Self {
        PokemonKey::Name(name)
    }
}

impl From<&String> for PokemonKey {
    fn from(name: &String) -> Self {
        PokemonKey::Name(name.clone())
    }
}

impl From<u32> for PokemonKey {
    fn from(id: u32) -> Self {
        PokemonKey::Id(id)
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

/// Name/url pair from the bulk list. Also the search result shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u32,
    name: String,
    types: Vec<TypeSlot>,
    sprites: Sprites,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    type_ref: NamedResource,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
    #[serde(default)]
    other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Deserialize)]
struct ArtworkSprites {
    front_default: Option<String>,
}

impl From<DetailResponse> for Pokemon {
    fn from(data: DetailResponse) -> Self {
        // Default sprite first, then official artwork
        let sprite = data
            .sprites
            .front_default
            .filter(|s| !s.is_empty())
            .or_else(|| {
                data.sprites
                    .other
                    .and_then(|o| o.official_artwork)
                    .and_then(|a| a.front_default)
            })
            .unwrap_or_default();

        Pokemon {
            id: data.id,
            name: data.name,
            types: data
                .types
                .into_iter()
                .map(|slot| PokemonType {
                    name: slot.type_ref.name,
                    url: slot.type_ref.url,
                })
                .collect(),
            sprite,
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    list_limit: usize,
    status: SharedStatus,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Self {
        Self::with_status(config, SharedStatus::new())
    }

    /// Client writing into an existing status handle.
    pub fn with_status(config: &Config, status: SharedStatus) -> Self {
        CatalogClient {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            list_limit: config.list_limit,
            status,
        }
    }

    pub fn status(&self) -> &SharedStatus {
        &self.status
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All names in catalog order. A failure is logged and yields an
    /// empty list; the shared error is left alone.
    pub async fn list_all_names(&self) -> Vec<String> {
        let _loading = self.status.begin_loading();

        match self.fetch_list().await {
            Ok(results) => {
                debug!(count = results.len(), "loaded catalog names");
                results.into_iter().map(|r| r.name).collect()
            }
            Err(e) => {
                warn!(error = %e, "failed to load catalog names");
                Vec::new()
            }
        }
    }

    /// Fetch one Pokemon. Returns `None` on any failure and records the
    /// failure message in the shared error.
    pub async fn fetch_by_name_or_id(&self, key: impl Into<PokemonKey>) -> Option<Pokemon> {
        let key = key.into();
        let _loading = self.status.begin_loading();
        self.status.clear_error();

        match self.fetch_detail(&key).await {
            Ok(pokemon) => {
                debug!(key = %key, id = pokemon.id, "fetched pokemon");
                Some(pokemon)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "failed to fetch pokemon");
                self.status.set_error(e.to_string());
                None
            }
        }
    }

    /// Case-insensitive substring search over the bulk list, truncated to
    /// `limit`. Issues its own list request every time.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<NamedResource> {
        let _loading = self.status.begin_loading();

        match self.fetch_list().await {
            Ok(results) => filter_by_name(results, query, limit),
            Err(e) => {
                warn!(query, error = %e, "search failed");
                self.status.set_error(e.to_string());
                Vec::new()
            }
        }
    }

    async fn fetch_list(&self) -> Result<Vec<NamedResource>, CatalogError> {
        let url = format!("{}/pokemon", self.base_url);
        debug!(url = %url, limit = self.list_limit, "requesting catalog list");

        let response = self
            .http
            .get(&url)
            .query(&[("limit", self.list_limit)])
            .send()
            .await?
            .error_for_status()?;

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(body.results)
    }

    async fn fetch_detail(&self, key: &PokemonKey) -> Result<Pokemon, CatalogError> {
        let url = format!(
            "{}/pokemon/{}",
            self.base_url,
            urlencoding::encode(&key.normalized())
        );

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            debug!(key = %key, status = %response.status(), "catalog rejected lookup");
            return Err(CatalogError::NotFound { key: key.normalized() });
        }

        let body: DetailResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(body.into())
    }
}

pub fn filter_by_name(results: Vec<NamedResource>, query: &str, limit: usize) -> Vec<NamedResource> {
    let query = query.to_lowercase();
    results
        .into_iter()
        .filter(|r| r.name.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}
