use crate::api::FeedbackApi;
use crate::config::Config;
use crate::domain::models::{
    CommentPayload, Credentials, EmployeeSummary, FeedbackRecord, FeedbackUpdate, LoginResponse,
    NewFeedback, OpaqueId, RegistrationProfile, TeamOverview,
};
use crate::error::{ClientError, Result};
use crate::session::SessionHandle;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// REST client for the feedback service. The bearer token is read from the session
/// store on every call, so a login elsewhere is picked up immediately.
pub struct HttpFeedbackApi {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl HttpFeedbackApi {
    pub fn new(config: &Config, session: SessionHandle) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: "client setup".to_string(),
                source,
            })?;
        Ok(Self::with_client(http, &config.api_base_url, session))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, session: SessionHandle) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.get_session() {
            Some(session) => req.bearer_auth(session.token),
            None => req,
        }
    }

    async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Response> {
        tracing::debug!(endpoint, "sending request");
        let resp = req.send().await.map_err(|source| {
            tracing::error!("{} failed: {}", endpoint, source);
            ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!("{} rejected credential ({})", endpoint, status);
            return Err(ClientError::Unauthorized {
                endpoint: endpoint.to_string(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::error!("{} returned {}: {}", endpoint, status, body);
        Err(ClientError::Server {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T> {
        resp.json::<T>().await.map_err(|source| {
            tracing::error!("{} returned an undecodable body: {}", endpoint, source);
            ClientError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = format!("GET {path}");
        let resp = self.send(&endpoint, self.request(Method::GET, path)).await?;
        Self::decode(&endpoint, resp).await
    }
}

#[async_trait]
impl FeedbackApi for HttpFeedbackApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let endpoint = "POST /auth/login";
        let req = self.request(Method::POST, "/auth/login").json(credentials);
        let resp = match self.send(endpoint, req).await {
            Ok(resp) => resp,
            Err(ClientError::Unauthorized { .. }) => return Err(ClientError::AuthenticationFailure),
            Err(ClientError::Server { status, .. }) if (400..500).contains(&status) => {
                return Err(ClientError::AuthenticationFailure)
            }
            Err(e) => return Err(e),
        };
        Self::decode(endpoint, resp).await
    }

    async fn register(&self, profile: &RegistrationProfile) -> Result<()> {
        let req = self.request(Method::POST, "/auth/register").json(profile);
        self.send("POST /auth/register", req).await?;
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>> {
        self.get_json("/feedback/employees").await
    }

    async fn team_overview(&self) -> Result<TeamOverview> {
        self.get_json("/feedback/team-overview").await
    }

    async fn list_feedback_given(&self) -> Result<Vec<FeedbackRecord>> {
        self.get_json("/feedback/given").await
    }

    async fn create_feedback(&self, payload: &NewFeedback) -> Result<FeedbackRecord> {
        let endpoint = "POST /feedback/";
        let req = self.request(Method::POST, "/feedback/").json(payload);
        let resp = self.send(endpoint, req).await?;
        Self::decode(endpoint, resp).await
    }

    async fn list_my_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        self.get_json("/user/feedback").await
    }

    async fn acknowledge(&self, id: &OpaqueId) -> Result<()> {
        let path = format!("/feedback/{id}/acknowledge");
        self.send(&format!("PUT {path}"), self.request(Method::PUT, &path))
            .await?;
        Ok(())
    }

    async fn add_comment(&self, id: &OpaqueId, text: &str) -> Result<()> {
        let path = format!("/feedback/{id}/comment");
        let body = CommentPayload {
            employee_comments: text.to_string(),
        };
        self.send(&format!("PUT {path}"), self.request(Method::PUT, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn update_feedback(&self, id: &OpaqueId, payload: &FeedbackUpdate) -> Result<FeedbackRecord> {
        let path = format!("/feedback/{id}");
        let endpoint = format!("PUT {path}");
        let resp = self
            .send(&endpoint, self.request(Method::PUT, &path).json(payload))
            .await?;
        Self::decode(&endpoint, resp).await
    }
}
