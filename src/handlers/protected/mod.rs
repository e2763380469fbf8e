// handlers/protected/mod.rs - Protected handlers (session required)
//
// Security Level: valid session cookie, plus the route family's permission
// Routes: /api/auth/me, /admin/api/* (catalog, promotions, orders, buyers, mail)
// Middleware: authenticate -> require_permission / require_tenant
//
// Every handler receives the caller's `AuthContext` and runs its queries
// against `ctx.database`, the pool resolved from the session token.

pub mod attribute_values; // manage_attribute_values
pub mod attributes;       // manage_attributes
pub mod buyers;           // tenant + manage_buyers
pub mod categories;       // manage_categories
pub mod coupons;          // manage_coupons
pub mod discounts;        // manage_discounts
pub mod mail;             // tenant only
pub mod orders;           // manage_orders
pub mod products;         // manage_products
pub mod session;          // any authenticated caller

pub use attribute_values::*;
pub use attributes::*;
pub use buyers::*;
pub use categories::*;
pub use coupons::*;
pub use discounts::*;
pub use mail::*;
pub use orders::*;
pub use products::*;
pub use session::*;
