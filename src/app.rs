use crate::api::{FeedbackApi, HttpFeedbackApi};
use crate::auth::{self, LoginOutcome};
use crate::config::Config;
use crate::dashboard::{EmployeeDashboard, ManagerDashboard};
use crate::domain::models::{Credentials, RegistrationProfile, Role};
use crate::error::{ClientError, Result};
use crate::guard::{guard, GuardDecision, Route};
use crate::session::{FileSessionStore, SessionHandle};
use std::sync::Arc;

/// Everything a view needs, handed to it explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: SessionHandle,
    pub api: Arc<dyn FeedbackApi>,
}

impl AppContext {
    pub fn new(config: Config, session: SessionHandle, api: Arc<dyn FeedbackApi>) -> Self {
        Self {
            config,
            session,
            api,
        }
    }

    /// File-backed session plus the HTTP client, as the binary runs.
    pub fn from_config(config: Config) -> Result<Self> {
        let session: SessionHandle = Arc::new(FileSessionStore::open(&config.session_file)?);
        let api = Arc::new(HttpFeedbackApi::new(&config, session.clone())?);
        Ok(Self::new(config, session, api))
    }

    pub async fn login(&self, credentials: &Credentials, requested_role: Role) -> Result<LoginOutcome> {
        auth::login(self.api.as_ref(), self.session.as_ref(), credentials, requested_role).await
    }

    pub async fn register(&self, profile: &RegistrationProfile) -> Result<Route> {
        auth::register(self.api.as_ref(), profile).await
    }

    pub fn logout(&self) -> Result<Route> {
        auth::logout(self.session.as_ref())
    }

    pub fn check_access(&self, required: Role) -> Result<()> {
        match guard(required, self.session.get_session().as_ref()) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Redirect(_) => {
                tracing::warn!("Redirecting to login: {} access denied", required);
                Err(ClientError::AccessDenied { required })
            }
        }
    }

    /// Guarded and mounted manager dashboard.
    pub async fn open_manager(&self) -> Result<ManagerDashboard> {
        self.check_access(Role::Manager)?;
        let mut dashboard = ManagerDashboard::new(self.api.clone());
        dashboard.mount().await?;
        Ok(dashboard)
    }

    /// Guarded and mounted employee dashboard.
    pub async fn open_employee(&self) -> Result<EmployeeDashboard> {
        self.check_access(Role::Employee)?;
        let mut dashboard = EmployeeDashboard::new(self.api.clone());
        dashboard.mount().await?;
        Ok(dashboard)
    }
}
