// Cache module for local filesystem caching.
// Keeps repository listings, READMEs, and the resolved username fresh for a per-kind TTL.

pub mod artifacts;
pub mod paths;
pub mod store;
pub mod ttl;

pub use artifacts::{Account, Cache, CacheKey, CacheTtls};
pub use paths::CachePaths;
pub use ttl::parse_ttl;
