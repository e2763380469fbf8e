pub mod email_template;
pub mod mailer;
pub mod notifier;
pub mod session_service;
pub mod tenant_service;

pub use mailer::{MailCredentials, MailError, Mailer, OutgoingMail, SmtpMailer};
pub use session_service::{LoginError, Session};
pub use tenant_service::{NewTenant, TenantError, TenantService};
