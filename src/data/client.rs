//! Entity client for the PokeAPI service
//!
//! `PokedexClient` resolves an entity name and identifier into a request URL
//! and hands it to the `CachedFetcher`. Batch lookups fan out with a bounded
//! number of in-flight requests and always return results in input order.

use futures::stream::{self, StreamExt};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{get_endpoint, Endpoint};
use super::fetcher::{CachedFetcher, FetchError};
use super::Identifier;
use crate::cache::CacheManager;
use crate::config::{ClientConfig, ConfigError};

/// Errors that can occur when looking up an entity
#[derive(Debug, Error)]
pub enum LookupError {
    /// The entity is not in the endpoint table
    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    /// An empty name was given as identifier
    #[error("Identifier must not be empty")]
    EmptyIdentifier,

    /// The single request behind this lookup failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One element of a fail-fast batch failed; the rest were abandoned
    #[error("Batch lookup failed at index {index} ({identifier}): {source}")]
    Batch {
        index: usize,
        identifier: Identifier,
        #[source]
        source: FetchError,
    },
}

/// Client for looking up PokeAPI entities
///
/// Every lookup goes through the same cache, so repeated lookups of the same
/// entity and identifier within the TTL cost a single request.
#[derive(Debug, Clone)]
pub struct PokedexClient {
    config: ClientConfig,
    fetcher: CachedFetcher,
    /// Parsed base URL, used to scope cookies
    base_url: Url,
}

impl PokedexClient {
    /// Creates a client with default settings and its own cache
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom settings and its own cache
    pub fn with_config(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_cache(config, CacheManager::new())
    }

    /// Creates a client that reads and fills an existing cache
    ///
    /// Pass clones of one `CacheManager` to several clients to share responses
    /// between them.
    pub fn with_cache(config: ClientConfig, cache: CacheManager) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(config.base_url.clone()))?;
        let fetcher = CachedFetcher::new(&config, cache)?;

        Ok(Self {
            config,
            fetcher,
            base_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The cache backing this client
    pub fn cache(&self) -> &CacheManager {
        self.fetcher.cache()
    }

    /// Drops every cached response
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Drops expired responses, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        self.cache().purge_expired()
    }

    /// Adds a cookie (in `Set-Cookie` syntax) for the upstream host
    ///
    /// Only sent when the client was built with credentials enabled.
    pub fn add_cookie(&self, cookie: &str) {
        self.fetcher.add_cookie(cookie, &self.base_url);
    }

    /// Builds the request URL for `entity` and `id` without fetching it
    ///
    /// # Example
    /// `url_for("pokemon", "pikachu")` gives `http://pokeapi.co/api/v2/pokemon/pikachu/`
    /// with the default configuration.
    pub fn url_for(&self, entity: &str, id: impl Into<Identifier>) -> Result<String, LookupError> {
        let endpoint = resolve_endpoint(entity)?;
        let id = checked_identifier(id.into())?;
        Ok(self.endpoint_url(endpoint, &id))
    }

    fn endpoint_url(&self, endpoint: &Endpoint, id: &Identifier) -> String {
        format!("{}{}/{}/", self.config.api_root(), endpoint.path, id)
    }

    /// Looks up a single entity by name or id
    ///
    /// # Arguments
    /// * `entity` - Endpoint name or path segment, e.g. `pokemon` or `pokemon_species`
    /// * `id` - Name or numeric id
    ///
    /// # Returns
    /// * `Ok(Value)` - The parsed response, possibly from cache
    /// * `Err(LookupError)` - Unknown entity, empty identifier, or the fetch failed
    pub async fn lookup(
        &self,
        entity: &str,
        id: impl Into<Identifier>,
    ) -> Result<Value, LookupError> {
        let endpoint = resolve_endpoint(entity)?;
        let id = checked_identifier(id.into())?;
        let url = self.endpoint_url(endpoint, &id);

        Ok(self
            .fetcher
            .fetch(&url, self.config.with_credentials)
            .await?)
    }

    /// Looks up several entities at once, failing on the first error
    ///
    /// At most `max_concurrency` requests are in flight. Results come back in
    /// the same order as `ids`. When any element fails, the remaining requests
    /// are dropped and `LookupError::Batch` names the failing element. An empty
    /// `ids` resolves to an empty vector without touching the network.
    pub async fn lookup_many<I>(&self, entity: &str, ids: I) -> Result<Vec<Value>, LookupError>
    where
        I: IntoIterator,
        I::Item: Into<Identifier>,
    {
        let endpoint = resolve_endpoint(entity)?;
        let ids = checked_identifiers(ids)?;
        debug!(entity = endpoint.path, count = ids.len(), "Batch lookup");

        let with_credentials = self.config.with_credentials;
        let mut slots: Vec<Option<Value>> = vec![None; ids.len()];
        let mut completed = stream::iter(ids.iter().enumerate())
            .map(|(index, id)| {
                let url = self.endpoint_url(endpoint, id);
                async move { (index, self.fetcher.fetch(&url, with_credentials).await) }
            })
            .buffer_unordered(self.config.max_concurrency.max(1));

        while let Some((index, result)) = completed.next().await {
            match result {
                Ok(value) => slots[index] = Some(value),
                Err(source) => {
                    return Err(LookupError::Batch {
                        index,
                        identifier: ids[index].clone(),
                        source,
                    })
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Looks up several entities at once, attempting every one
    ///
    /// Returns one result per identifier, in input order. Only an unknown
    /// entity or an empty identifier fails the whole call.
    pub async fn lookup_each<I>(
        &self,
        entity: &str,
        ids: I,
    ) -> Result<Vec<Result<Value, FetchError>>, LookupError>
    where
        I: IntoIterator,
        I::Item: Into<Identifier>,
    {
        let endpoint = resolve_endpoint(entity)?;
        let ids = checked_identifiers(ids)?;
        debug!(entity = endpoint.path, count = ids.len(), "Batch lookup, collecting all");

        let with_credentials = self.config.with_credentials;
        let results: Vec<_> = stream::iter(ids.iter())
            .map(|id| {
                let url = self.endpoint_url(endpoint, id);
                async move { self.fetcher.fetch(&url, with_credentials).await }
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        Ok(results)
    }

    /// Callback-style `lookup`: `callback` runs exactly once with the outcome
    pub async fn lookup_with_callback<F>(&self, entity: &str, id: impl Into<Identifier>, callback: F)
    where
        F: FnOnce(Result<Value, LookupError>),
    {
        callback(self.lookup(entity, id).await);
    }

    /// Callback-style `lookup_many`: `callback` runs exactly once with the outcome
    pub async fn lookup_many_with_callback<I, F>(&self, entity: &str, ids: I, callback: F)
    where
        I: IntoIterator,
        I::Item: Into<Identifier>,
        F: FnOnce(Result<Vec<Value>, LookupError>),
    {
        callback(self.lookup_many(entity, ids).await);
    }
}

fn resolve_endpoint(entity: &str) -> Result<&'static Endpoint, LookupError> {
    get_endpoint(entity).ok_or_else(|| LookupError::UnknownEntity(entity.to_string()))
}

fn checked_identifier(id: Identifier) -> Result<Identifier, LookupError> {
    if id.is_empty() {
        return Err(LookupError::EmptyIdentifier);
    }
    Ok(id)
}

fn checked_identifiers<I>(ids: I) -> Result<Vec<Identifier>, LookupError>
where
    I: IntoIterator,
    I::Item: Into<Identifier>,
{
    ids.into_iter()
        .map(|id| checked_identifier(id.into()))
        .collect()
}

/// Generates one single-identifier method per endpoint, each delegating to `lookup`
macro_rules! entity_methods {
    ($($method:ident => $entity:literal,)*) => {
        impl PokedexClient {
            $(
                #[doc = concat!("Looks up a single `", $entity, "`.")]
                pub async fn $method(
                    &self,
                    id: impl Into<Identifier>,
                ) -> Result<Value, LookupError> {
                    self.lookup($entity, id).await
                }
            )*
        }

        #[cfg(test)]
        const ENTITY_METHOD_TARGETS: &[&str] = &[$($entity),*];
    };
}

entity_methods! {
    get_berry_by_name => "berry",
    get_berry_firmness_by_name => "berry-firmness",
    get_berry_flavor_by_name => "berry-flavor",
    get_contest_type_by_name => "contest-type",
    get_contest_effect_by_id => "contest-effect",
    get_super_contest_effect_by_id => "super-contest-effect",
    get_encounter_method_by_name => "encounter-method",
    get_encounter_condition_by_name => "encounter-condition",
    get_encounter_condition_value_by_name => "encounter-condition-value",
    get_evolution_chain_by_id => "evolution-chain",
    get_evolution_trigger_by_name => "evolution-trigger",
    get_generation_by_name => "generation",
    get_pokedex_by_name => "pokedex",
    get_version_by_name => "version",
    get_version_group_by_name => "version-group",
    get_item_by_name => "item",
    get_item_attribute_by_name => "item-attribute",
    get_item_category_by_name => "item-category",
    get_item_fling_effect_by_name => "item-fling-effect",
    get_item_pocket_by_name => "item-pocket",
    get_move_by_name => "move",
    get_move_ailment_by_name => "move-ailment",
    get_move_battle_style_by_name => "move-battle-style",
    get_move_category_by_name => "move-category",
    get_move_damage_class_by_name => "move-damage-class",
    get_move_learn_method_by_name => "move-learn-method",
    get_move_target_by_name => "move-target",
    get_location_by_name => "location",
    get_location_area_by_name => "location-area",
    get_pal_park_area_by_name => "pal-park-area",
    get_region_by_name => "region",
    get_ability_by_name => "ability",
    get_characteristic_by_id => "characteristic",
    get_egg_group_by_name => "egg-group",
    get_gender_by_name => "gender",
    get_growth_rate_by_name => "growth-rate",
    get_nature_by_name => "nature",
    get_pokeathlon_stat_by_name => "pokeathlon-stat",
    get_pokemon_by_name => "pokemon",
    get_pokemon_color_by_name => "pokemon-color",
    get_pokemon_form_by_name => "pokemon-form",
    get_pokemon_habitat_by_name => "pokemon-habitat",
    get_pokemon_shape_by_name => "pokemon-shape",
    get_pokemon_species_by_name => "pokemon-species",
    get_stat_by_name => "stat",
    get_type_by_name => "type",
    get_language_by_name => "language",
}
