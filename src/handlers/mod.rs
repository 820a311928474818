// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT required). Ownership and role
// checks inside protected handlers go through `crate::policy::authorize`.

pub mod extract;
pub mod protected;
pub mod public;
