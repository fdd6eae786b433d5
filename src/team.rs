// 🧑‍🤝‍🧑 Team Store - the six-slot team and its coverage statistics
//
// All mutation goes through place/remove/clear. A place captures nothing
// before its fetch: the fetched Pokemon is written into whatever the team
// looks like when the fetch resolves, so places on different slots never
// lose each other's work. Two places on the same slot race and the last
// fetch to resolve wins.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, PokemonKey};
use crate::error::TeamError;
use crate::models::{Team, TeamStats, TEAM_SIZE};
use crate::status::SharedStatus;

#[derive(Debug, Clone)]
pub struct TeamStore {
    catalog: CatalogClient,
    team: Arc<Mutex<Team>>,
    type_universe: usize,
}

impl TeamStore {
    /// Empty team backed by `catalog`, with coverage measured against
    /// `type_universe` type names.
    pub fn new(catalog: CatalogClient, type_universe: usize) -> Self {
        TeamStore {
            catalog,
            team: Arc::new(Mutex::new(Team::new())),
            type_universe,
        }
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn status(&self) -> &SharedStatus {
        self.catalog.status()
    }

    pub fn type_universe(&self) -> usize {
        self.type_universe
    }

    /// Snapshot of the current team.
    pub fn team(&self) -> Team {
        self.lock().clone()
    }

    /// Fetch `key` and put it in slot `position`.
    ///
    /// Returns `Ok(true)` when the slot was filled and `Ok(false)` when the
    /// fetch came back empty (the fetch already recorded its error). An
    /// out-of-range position is rejected before any network call.
    pub async fn place(&self, key: impl Into<PokemonKey>, position: usize) -> Result<bool, TeamError> {
        self.check_position(position)?;
        let key = key.into();

        let Some(pokemon) = self.catalog.fetch_by_name_or_id(key.clone()).await else {
            debug!(key = %key, position, "nothing to place");
            return Ok(false);
        };

        info!(name = %pokemon.name, position, "placed pokemon");
        self.lock().set_slot(position, Some(pokemon));
        Ok(true)
    }

    /// Empty slot `position`. Removing from an empty slot is a no-op.
    pub fn remove(&self, position: usize) -> Result<(), TeamError> {
        self.check_position(position)?;
        self.lock().set_slot(position, None);
        debug!(position, "removed pokemon");
        Ok(())
    }

    pub fn clear(&self) {
        self.lock().clear();
        debug!("cleared team");
    }

    pub fn stats(&self) -> TeamStats {
        self.lock().stats(self.type_universe)
    }

    fn check_position(&self, position: usize) -> Result<(), TeamError> {
        if position >= TEAM_SIZE {
            let err = TeamError::InvalidPosition(position);
            warn!(position, "rejected team position");
            self.status().set_error(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Team> {
        self.team.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
