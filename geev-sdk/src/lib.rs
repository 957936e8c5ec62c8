//! Shared object types and HTTP client for the Geev leaderboard API.
//!
//! The `objects` module holds the wire types exchanged between the
//! leaderboard server and its callers. The optional `client` feature adds a
//! typed `reqwest` client for those endpoints.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
