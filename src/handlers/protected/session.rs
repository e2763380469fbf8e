// handlers/protected/session.rs - GET /api/auth/me

use axum::Extension;

use crate::auth::{AuthContext, SessionSummary};
use crate::middleware::{ApiResponse, ApiResult};

/**
 * GET /api/auth/me - Describe the authenticated caller
 *
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "userId": "...",
 *     "tenantId": "...",
 *     "dbName": "tenant_3f2a...",
 *     "isSuperAdmin": false,
 *     "role": "Editor",
 *     "fullName": "Ana Anić",
 *     "tenantName": "Acme",
 *     "permissions": ["manage_products"]
 *   }
 * }
 * ```
 *
 * Permissions are the snapshot taken at login, not the current tenant setup.
 */
pub async fn me_get(Extension(ctx): Extension<AuthContext>) -> ApiResult<SessionSummary> {
    Ok(ApiResponse::success(ctx.summary()))
}
