// Team Builder - Core Library
// Exposes all modules for use in the terminal UI, the API server, and tests

pub mod models;
pub mod error;
pub mod status;
pub mod config;
pub mod logging;
pub mod catalog;   // Catalog client - only network I/O
pub mod team;      // Team store - six slots + coverage
pub mod browse;    // Browse state - search, chips, paging, target slot

// Re-export commonly used types
pub use models::{
    Pokemon, PokemonType, Team, TeamStats,
    capitalize, coverage_percent, KNOWN_TYPES, TEAM_SIZE, TYPE_UNIVERSE,
};
pub use error::{CatalogError, TeamError};
pub use status::{SharedStatus, Status, LoadingGuard};
pub use config::Config;
pub use logging::init_tracing;
pub use catalog::{CatalogClient, NamedResource, PokemonKey, DEFAULT_SEARCH_LIMIT};
pub use team::TeamStore;
pub use browse::{BrowseState, PendingPick, PickError, fetch_details};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
