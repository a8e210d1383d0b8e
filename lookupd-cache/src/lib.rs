//! # lookupd TTL Cache
//!
//! Generic in-memory key/value store with per-entry expiration, shared by all
//! request handlers as a write-through layer in front of slow, rate-limited
//! upstream lookups.
//!
//! The store is deliberately unbounded: there is no capacity limit and no
//! size-based eviction. Callers keep growth in check by choosing finite TTLs;
//! a background [`sweeper`](TtlCache::spawn_sweeper) reclaims expired entries
//! periodically.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use lookupd_cache::TtlCache;
//!
//! let cache: TtlCache<String> = TtlCache::new();
//! cache.set("whois:example.com", "cached response".into(), Duration::from_secs(60));
//! assert!(cache.get("whois:example.com").is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod cache;
mod sweep;

pub use cache::{CacheStats, TtlCache};
pub use sweep::{SweeperHandle, DEFAULT_SWEEP_INTERVAL};
