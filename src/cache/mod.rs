//! Cache module for storing API responses in memory
//!
//! This module provides a cache manager that keeps parsed API responses keyed by
//! request URL with a configurable TTL (time-to-live). Expiry is evaluated lazily
//! against an injectable clock, so nothing runs in the background.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheManager, CachedData};
