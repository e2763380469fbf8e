pub mod auth;
pub mod response;

pub use auth::{authenticate, require_permission, require_super_admin, require_tenant};
pub use response::{ApiResponse, ApiResult};
