//! Static endpoint table for the PokeAPI service
//!
//! Maps each entity the client can look up to the URL path segment the
//! upstream service serves it under. The table is plain data: every lookup
//! goes through the same code path regardless of entity.

/// Which kind of identifier the upstream documents for an endpoint
///
/// Purely informational: both names and numeric ids are accepted everywhere,
/// the upstream decides what resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Addressed by name (e.g. `pikachu`), numeric ids also work
    Name,
    /// Addressed by numeric id only
    Id,
}

/// A single entity exposed by the upstream service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Rust-style name of the entity (e.g. `berry_firmness`)
    pub name: &'static str,
    /// URL path segment (e.g. `berry-firmness`)
    pub path: &'static str,
    /// Identifier kind the upstream documents for this entity
    pub addressed_by: AddressKind,
}

/// Static array of every endpoint the client knows about
pub static ENDPOINTS: [Endpoint; 47] = [
    Endpoint {
        name: "berry",
        path: "berry",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "berry_firmness",
        path: "berry-firmness",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "berry_flavor",
        path: "berry-flavor",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "contest_type",
        path: "contest-type",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "contest_effect",
        path: "contest-effect",
        addressed_by: AddressKind::Id,
    },
    Endpoint {
        name: "super_contest_effect",
        path: "super-contest-effect",
        addressed_by: AddressKind::Id,
    },
    Endpoint {
        name: "encounter_method",
        path: "encounter-method",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "encounter_condition",
        path: "encounter-condition",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "encounter_condition_value",
        path: "encounter-condition-value",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "evolution_chain",
        path: "evolution-chain",
        addressed_by: AddressKind::Id,
    },
    Endpoint {
        name: "evolution_trigger",
        path: "evolution-trigger",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "generation",
        path: "generation",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokedex",
        path: "pokedex",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "version",
        path: "version",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "version_group",
        path: "version-group",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "item",
        path: "item",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "item_attribute",
        path: "item-attribute",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "item_category",
        path: "item-category",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "item_fling_effect",
        path: "item-fling-effect",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "item_pocket",
        path: "item-pocket",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move",
        path: "move",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_ailment",
        path: "move-ailment",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_battle_style",
        path: "move-battle-style",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_category",
        path: "move-category",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_damage_class",
        path: "move-damage-class",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_learn_method",
        path: "move-learn-method",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "move_target",
        path: "move-target",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "location",
        path: "location",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "location_area",
        path: "location-area",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pal_park_area",
        path: "pal-park-area",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "region",
        path: "region",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "ability",
        path: "ability",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "characteristic",
        path: "characteristic",
        addressed_by: AddressKind::Id,
    },
    Endpoint {
        name: "egg_group",
        path: "egg-group",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "gender",
        path: "gender",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "growth_rate",
        path: "growth-rate",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "nature",
        path: "nature",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokeathlon_stat",
        path: "pokeathlon-stat",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon",
        path: "pokemon",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon_color",
        path: "pokemon-color",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon_form",
        path: "pokemon-form",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon_habitat",
        path: "pokemon-habitat",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon_shape",
        path: "pokemon-shape",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "pokemon_species",
        path: "pokemon-species",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "stat",
        path: "stat",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "type",
        path: "type",
        addressed_by: AddressKind::Name,
    },
    Endpoint {
        name: "language",
        path: "language",
        addressed_by: AddressKind::Name,
    },
];

/// Returns all known endpoints
pub fn all_endpoints() -> &'static [Endpoint] {
    &ENDPOINTS
}

/// Finds an endpoint by its name or path segment
///
/// Both `berry_firmness` and `berry-firmness` resolve to the same endpoint.
/// Matching is exact otherwise; no case folding is applied.
pub fn get_endpoint(entity: &str) -> Option<&'static Endpoint> {
    ENDPOINTS
        .iter()
        .find(|endpoint| endpoint.path == entity || endpoint.name == entity)
}
