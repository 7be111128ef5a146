use crate::api::FeedbackApi;
use crate::domain::models::{Credentials, RegistrationProfile, Role};
use crate::error::{ClientError, Result};
use crate::guard::{landing_route, Route};
use crate::session::{Session, SessionStore};
use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub landing: Route,
}

/// Logs in and stores the session. The role comes from the server when it says one
/// (response body, then token claims); otherwise the role picked on the login form is
/// trusted. On failure the existing session is left alone.
pub async fn login(
    api: &dyn FeedbackApi,
    store: &dyn SessionStore,
    credentials: &Credentials,
    requested_role: Role,
) -> Result<LoginOutcome> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(ClientError::Validation("username and password are required".into()));
    }

    let resp = api.login(credentials).await.map_err(|e| {
        tracing::warn!("Login failed for {}: {}", credentials.username, e);
        e
    })?;

    let role = resp
        .role
        .or_else(|| role_claim(&resp.access_token))
        .unwrap_or(requested_role);
    if role != requested_role {
        tracing::info!(
            "Server reports role {} for {}, requested {}",
            role,
            credentials.username,
            requested_role
        );
    }

    let session = Session {
        token: resp.access_token,
        role,
    };
    store.set_session(session.clone())?;
    tracing::info!("{} logged in as {}", credentials.username, role);

    Ok(LoginOutcome {
        session,
        landing: landing_route(role),
    })
}

/// Registers an account; the caller continues on the login page.
pub async fn register(api: &dyn FeedbackApi, profile: &RegistrationProfile) -> Result<Route> {
    if profile.username.trim().is_empty() || profile.email.trim().is_empty() || profile.password.is_empty() {
        return Err(ClientError::Validation("username, email and password are required".into()));
    }
    api.register(profile).await.map_err(|e| {
        tracing::warn!("Signup failed for {}: {}", profile.username, e);
        e
    })?;
    tracing::info!("Registered {} as {}", profile.username, profile.role);
    Ok(Route::Login)
}

pub fn logout(store: &dyn SessionStore) -> Result<Route> {
    store.clear_session()?;
    Ok(Route::Login)
}

/// Reads a `role` claim from an unverified JWT payload, if the token is one.
fn role_claim(token: &str) -> Option<Role> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("role")?.as_str()?.parse().ok()
}
