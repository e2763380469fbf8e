// handlers/protected/mail.rs - POST /admin/api/send-email (tenant users only)

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthContext;
use crate::database::service::find_tenant;
use crate::error::ApiError;
use crate::handlers::utils::{non_empty, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::mailer::{MailError, OutgoingMail};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailBody {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
}

/**
 * POST /admin/api/send-email - Send an email from the tenant's mailbox
 *
 * ```json
 * { "to": "ana@example.com", "subject": "Vaša porudžbina", "html": "<p>...</p>" }
 * ```
 *
 * Unlike the order status notification, delivery failures are returned
 * to the caller (502, or 503 when outbound mail is disabled).
 */
pub async fn send_email(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<SendEmailBody>,
) -> ApiResult<Value> {
    let tenant_id = ctx.require_tenant()?;
    Required::new()
        .text("to", &body.to)
        .text("subject", &body.subject)
        .text("html", &body.html)
        .check()?;

    let settings = state.databases.settings_pool().await?;
    let tenant = find_tenant(&settings, tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))?;
    let credentials = tenant.mail_credentials().ok_or(MailError::MissingCredentials)?;

    let mail = OutgoingMail {
        to: non_empty(&body.to).unwrap_or_default().to_string(),
        subject: non_empty(&body.subject).unwrap_or_default().to_string(),
        html: body.html.unwrap_or_default(),
    };
    let to = mail.to.clone();

    state.mailer.send(&credentials, mail).await?;
    tracing::info!("Tenant {} sent email to {}", tenant.name, to);

    Ok(ApiResponse::message("Email sent"))
}
