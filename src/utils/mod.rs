pub mod caching;
pub mod fixed_point;
pub mod logging;
pub mod monitoring;

pub use caching::{CacheKey, CacheStatus, CacheStore, CacheTtls, InMemoryStore, ReadThroughCache, RedisStore};
pub use monitoring::ApiMetrics;
