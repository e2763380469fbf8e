// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no session) -> Protected (session + route permission) -> Elevated (super-admin)
//
pub mod elevated;  // Tier 3: /admin/api/{tenants,users,roles}
pub mod protected; // Tier 2: /api/auth/me and tenant resource families
pub mod public;    // Tier 1: /, /health, /login/api/*
pub mod utils;     // Body and query parsing shared by all tiers
