// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, catalog browsing and the reference-data lookup.

pub mod auth;
pub mod listings;
pub mod search;
pub mod system;
