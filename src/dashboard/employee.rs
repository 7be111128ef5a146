use crate::api::FeedbackApi;
use crate::dashboard::LoadState;
use crate::domain::models::{FeedbackRecord, OpaqueId};
use crate::domain::view::EmployeeCard;
use crate::error::{ClientError, Result};
use crate::report::{Report, ReportView};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct EmployeeDashboard {
    api: Arc<dyn FeedbackApi>,
    state: LoadState,
    feedbacks: Vec<FeedbackRecord>,
    comment_drafts: HashMap<OpaqueId, String>,
}

impl EmployeeDashboard {
    pub fn new(api: Arc<dyn FeedbackApi>) -> Self {
        Self {
            api,
            state: LoadState::Idle,
            feedbacks: Vec::new(),
            comment_drafts: HashMap::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn feedbacks(&self) -> &[FeedbackRecord] {
        &self.feedbacks
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.refresh().await
    }

    /// Reloads the list; on failure the current list stays on screen.
    pub async fn refresh(&mut self) -> Result<()> {
        let previous = self.state;
        self.state = LoadState::Loading;
        match self.api.list_my_feedback().await {
            Ok(feedbacks) => {
                self.feedbacks = feedbacks;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching feedbacks: {}", e);
                self.state = previous;
                Err(e)
            }
        }
    }

    pub fn cards(&self) -> Vec<EmployeeCard> {
        self.feedbacks.iter().map(EmployeeCard::from).collect()
    }

    /// Sent even if the record is already acknowledged.
    pub async fn acknowledge(&mut self, id: &OpaqueId) -> Result<()> {
        self.ensure_listed(id)?;
        self.api.acknowledge(id).await.map_err(|e| {
            tracing::error!("Acknowledge failed: {}", e);
            e
        })?;
        self.reload_after_write().await;
        Ok(())
    }

    pub fn set_comment_draft(&mut self, id: &OpaqueId, text: &str) {
        self.comment_drafts.insert(id.clone(), text.to_string());
    }

    pub fn comment_draft(&self, id: &OpaqueId) -> &str {
        self.comment_drafts.get(id).map(String::as_str).unwrap_or("")
    }

    /// Sends the record's draft, replacing any earlier comment. The draft is cleared
    /// only once the server accepted it.
    pub async fn add_comment(&mut self, id: &OpaqueId) -> Result<()> {
        self.ensure_listed(id)?;
        let text = self.comment_draft(id).to_string();
        self.api.add_comment(id, &text).await.map_err(|e| {
            tracing::error!("Add comment failed: {}", e);
            e
        })?;
        self.comment_drafts.remove(id);
        self.reload_after_write().await;
        Ok(())
    }

    pub fn report(&self) -> Report {
        Report::build(ReportView::Employee, &self.feedbacks)
    }

    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf> {
        self.report().save(dir)
    }

    fn ensure_listed(&self, id: &OpaqueId) -> Result<()> {
        if self.feedbacks.iter().any(|fb| &fb.id == id) {
            Ok(())
        } else {
            Err(ClientError::UnknownFeedback(id.to_string()))
        }
    }

    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after write failed: {}", e);
        }
    }
}
