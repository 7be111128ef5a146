pub mod http;

use crate::domain::models::{
    Credentials, EmployeeSummary, FeedbackRecord, FeedbackUpdate, LoginResponse, NewFeedback,
    OpaqueId, RegistrationProfile, TeamOverview,
};
use crate::error::Result;
use async_trait::async_trait;

pub use http::HttpFeedbackApi;

/// One method per domain action, each a single round trip to the feedback service.
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;
    async fn register(&self, profile: &RegistrationProfile) -> Result<()>;
    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>>;
    async fn team_overview(&self) -> Result<TeamOverview>;
    async fn list_feedback_given(&self) -> Result<Vec<FeedbackRecord>>;
    async fn create_feedback(&self, payload: &NewFeedback) -> Result<FeedbackRecord>;
    async fn list_my_feedback(&self) -> Result<Vec<FeedbackRecord>>;
    async fn acknowledge(&self, id: &OpaqueId) -> Result<()>;
    async fn add_comment(&self, id: &OpaqueId, text: &str) -> Result<()>;
    async fn update_feedback(&self, id: &OpaqueId, payload: &FeedbackUpdate) -> Result<FeedbackRecord>;
}
