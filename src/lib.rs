//! Pokedex client library
//!
//! A cached, async client for the PokeAPI REST service. Each entity ("berry",
//! "move", "pokemon", ...) is fetched with a GET on a predictable URL, parsed
//! as JSON and kept in an in-memory cache for a fixed time-to-live.

pub mod cache;
pub mod config;
pub mod data;

pub use cache::{CacheManager, CachedData, Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, ConfigError};
pub use data::{
    AddressKind, CachedFetcher, Endpoint, FetchError, Identifier, LookupError, PokedexClient,
};
