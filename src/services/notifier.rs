//! Best-effort customer email after an order status change.
//!
//! Runs after the status update has committed. Nothing here can fail the
//! request: every error is logged and dropped, and there is no retry.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{OrderDetail, Tenant};
use crate::database::DatabaseError;
use crate::database::service::find_tenant;
use crate::services::email_template::{status_change_html, status_subject};
use crate::services::mailer::{MailError, Mailer, OutgoingMail};

/// Send the status email using the tenant's own mailbox.
pub async fn send_status_email(mailer: &dyn Mailer, tenant: &Tenant, detail: &OrderDetail) -> Result<(), MailError> {
    let credentials = tenant.mail_credentials().ok_or(MailError::MissingCredentials)?;
    let mail = OutgoingMail {
        to: detail.order.customer_email.clone(),
        subject: status_subject(&tenant.name, detail.order.status),
        html: status_change_html(&tenant.name, tenant.business_email.as_deref(), detail),
    };
    mailer.send(&credentials, mail).await
}

/// Look up the tenant in the settings database and send the email,
/// swallowing every failure.
pub async fn notify_status_change(mailer: &dyn Mailer, settings: &PgPool, tenant_id: Uuid, detail: &OrderDetail) {
    let lookup = find_tenant(settings, tenant_id).await;
    deliver_status_email(mailer, tenant_id, lookup, detail).await;
}

/// Send the status email for an already-resolved tenant lookup. Returns
/// whether a message went out; failures are logged only.
pub async fn deliver_status_email(
    mailer: &dyn Mailer,
    tenant_id: Uuid,
    lookup: Result<Option<Tenant>, DatabaseError>,
    detail: &OrderDetail,
) -> bool {
    let tenant = match lookup {
        Ok(Some(tenant)) => tenant,
        Ok(None) => {
            tracing::warn!("Order {}: tenant {} not found, skipping status email", detail.order.id, tenant_id);
            return false;
        }
        Err(e) => {
            tracing::warn!("Order {}: tenant lookup failed, skipping status email: {}", detail.order.id, e);
            return false;
        }
    };

    match send_status_email(mailer, &tenant, detail).await {
        Ok(()) => {
            tracing::info!(
                "Order {}: status email sent to {}",
                detail.order.id,
                detail.order.customer_email
            );
            true
        }
        Err(e) => {
            tracing::warn!("Order {}: status email not sent: {}", detail.order.id, e);
            false
        }
    }
}
