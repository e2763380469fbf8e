// handlers/elevated/mod.rs - Elevated handlers (super-admin session required)
//
// Security Level: super-admin only
// Routes: /admin/api/tenants, /admin/api/users, /admin/api/roles
// Middleware: authenticate -> require_super_admin
//
// A super-admin's resolved database is the settings database, so these
// handlers read and write the platform registry directly.

pub mod roles;   // Named permission bundles
pub mod tenants; // Tenant registry and database provisioning
pub mod users;   // Staff accounts, soft delete and purge

pub use roles::*;
pub use tenants::*;
pub use users::*;
