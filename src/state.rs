use std::sync::Arc;

use crate::auth::{AuthError, TokenService};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::mailer::{Mailer, SmtpMailer};

/// Everything handlers share, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub databases: DatabaseManager,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
        let databases = DatabaseManager::new(&config.database);
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.mail.clone()));

        Ok(Self {
            config: Arc::new(config),
            databases,
            tokens,
            mailer,
        })
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Session cookies carry `Secure` whenever HTTPS is required.
    pub fn secure_cookies(&self) -> bool {
        self.config.security.require_https
    }
}
