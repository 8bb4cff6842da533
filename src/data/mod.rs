//! Core data types and clients for the PokeAPI service
//!
//! This module contains the identifier type used to address entities, the
//! static endpoint table, the cached fetcher and the entity client built on it.

pub mod client;
pub mod endpoints;
pub mod fetcher;

pub use client::{LookupError, PokedexClient};
pub use endpoints::{all_endpoints, get_endpoint, AddressKind, Endpoint, ENDPOINTS};
pub use fetcher::{CachedFetcher, FetchError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Addresses a single instance of an entity
///
/// Rendered verbatim as the last path segment of the request URL. Apart from
/// rejecting empty names, no validation happens here; an identifier the
/// upstream does not know simply comes back as a 404.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric id, e.g. `25`
    Id(u64),
    /// Name, e.g. `pikachu`
    Name(String),
}

impl Identifier {
    /// True for a name with no characters
    pub fn is_empty(&self) -> bool {
        matches!(self, Identifier::Name(name) if name.is_empty())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{}", id),
            Identifier::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::Name(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::Name(name)
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Identifier::Name(name.clone())
    }
}

/// Integers that do not fit a `u64` (negative ones) are kept verbatim as names
macro_rules! identifier_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Identifier {
                fn from(id: $int) -> Self {
                    u64::try_from(id)
                        .map(Identifier::Id)
                        .unwrap_or_else(|_| Identifier::Name(id.to_string()))
                }
            }
        )*
    };
}

identifier_from_int!(i32, i64, u8, u16, u32, u64, usize);
