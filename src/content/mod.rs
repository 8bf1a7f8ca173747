//! External content: fetch collaborators, TTL caches, feed parsing and the proxy relay.

/// TTL memoization for widget content.
pub mod cache;
/// RSS item extraction.
pub mod feed;
/// Fetch collaborators.
pub mod fetch;
/// Proxy relay contract.
pub mod proxy;
