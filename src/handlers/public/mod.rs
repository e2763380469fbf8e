// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: /, /health, /login/api/*

pub mod session; // Cookie session start and end
pub mod system;  // Service description and health probe

pub use session::{login_post, logout_post};
pub use system::{health, root};
