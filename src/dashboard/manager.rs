use crate::api::FeedbackApi;
use crate::dashboard::LoadState;
use crate::domain::chart::{sentiment_chart, ChartSlice};
use crate::domain::models::{
    EmployeeSummary, FeedbackRecord, FeedbackUpdate, NewFeedback, OpaqueId, Sentiment,
    TeamOverview,
};
use crate::domain::tags::{join_tags, parse_tags};
use crate::domain::view::ManagerCard;
use crate::error::{ClientError, Result};
use crate::report::{Report, ReportView};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The "give feedback" form. An empty `selected_employee` means nobody is selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeForm {
    pub selected_employee: String,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub tags: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackDraft {
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub tags: String,
}

impl FeedbackDraft {
    pub fn from_record(fb: &FeedbackRecord) -> Self {
        Self {
            strengths: fb.strengths.clone().unwrap_or_default(),
            improvements: fb.improvements.clone().unwrap_or_default(),
            sentiment: fb.sentiment.unwrap_or_default(),
            tags: join_tags(&fb.tags),
        }
    }

    pub fn to_update(&self) -> FeedbackUpdate {
        FeedbackUpdate {
            strengths: self.strengths.clone(),
            improvements: self.improvements.clone(),
            sentiment: self.sentiment,
            tags: parse_tags(&self.tags),
        }
    }
}

/// The single edit buffer. Starting an edit replaces whatever was here, unsaved or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSlot {
    #[default]
    None,
    Editing { id: OpaqueId, buffer: FeedbackDraft },
}

pub struct ManagerDashboard {
    api: Arc<dyn FeedbackApi>,
    state: LoadState,
    employees: Vec<EmployeeSummary>,
    overview: Option<TeamOverview>,
    history: Vec<FeedbackRecord>,
    pub compose: ComposeForm,
    edit: EditSlot,
    submitting: bool,
}

impl ManagerDashboard {
    pub fn new(api: Arc<dyn FeedbackApi>) -> Self {
        Self {
            api,
            state: LoadState::Idle,
            employees: Vec::new(),
            overview: None,
            history: Vec::new(),
            compose: ComposeForm::default(),
            edit: EditSlot::None,
            submitting: false,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn employees(&self) -> &[EmployeeSummary] {
        &self.employees
    }

    pub fn overview(&self) -> Option<&TeamOverview> {
        self.overview.as_ref()
    }

    pub fn history(&self) -> &[FeedbackRecord] {
        &self.history
    }

    pub fn edit_slot(&self) -> &EditSlot {
        &self.edit
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.refresh().await
    }

    /// Fetches employees, overview and history together. All three must succeed;
    /// otherwise the previously shown data stays and the error is returned.
    pub async fn refresh(&mut self) -> Result<()> {
        let previous = self.state;
        self.state = LoadState::Loading;

        let fetched = futures::try_join!(
            self.api.list_employees(),
            self.api.team_overview(),
            self.api.list_feedback_given()
        );

        match fetched {
            Ok((employees, overview, history)) => {
                tracing::debug!(
                    "Manager dashboard loaded: {} employees, {} feedbacks",
                    employees.len(),
                    history.len()
                );
                self.employees = employees;
                self.overview = Some(overview);
                self.history = history;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Manager dashboard load failed: {}", e);
                self.state = previous;
                Err(e)
            }
        }
    }

    pub fn select_employee(&mut self, id: &str) {
        self.compose.selected_employee = id.to_string();
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.compose.selected_employee.trim().is_empty() && !self.submitting
    }

    /// Sends the compose form. On success the form is reset and everything reloaded;
    /// on failure the form is left as typed.
    pub async fn submit(&mut self) -> Result<FeedbackRecord> {
        if !self.can_submit() {
            return Err(ClientError::Validation("select an employee first".into()));
        }

        let payload = NewFeedback {
            employee_id: self.selected_employee_id(),
            strengths: self.compose.strengths.clone(),
            improvements: self.compose.improvements.clone(),
            sentiment: self.compose.sentiment,
            tags: parse_tags(&self.compose.tags),
        };

        self.submitting = true;
        let result = self.api.create_feedback(&payload).await;
        self.submitting = false;

        let created = result.map_err(|e| {
            tracing::error!("Submit feedback failed: {}", e);
            e
        })?;
        self.compose = ComposeForm::default();
        self.reload_after_write().await;
        Ok(created)
    }

    // Echo the id exactly as the employee list delivered it.
    fn selected_employee_id(&self) -> OpaqueId {
        let selected = self.compose.selected_employee.as_str();
        match self.employees.iter().find(|e| e.id.as_str() == selected) {
            Some(employee) => employee.id.clone(),
            None => {
                tracing::warn!("Employee {} is not in the loaded list", selected);
                OpaqueId::from(selected)
            }
        }
    }

    pub fn start_edit(&mut self, id: &OpaqueId) -> Result<()> {
        let fb = self
            .history
            .iter()
            .find(|fb| &fb.id == id)
            .ok_or_else(|| ClientError::UnknownFeedback(id.to_string()))?;
        if let EditSlot::Editing { id: previous, .. } = &self.edit {
            if previous != id {
                tracing::debug!("Discarding unsaved edit of feedback {}", previous);
            }
        }
        self.edit = EditSlot::Editing {
            id: fb.id.clone(),
            buffer: FeedbackDraft::from_record(fb),
        };
        Ok(())
    }

    pub fn editing_id(&self) -> Option<&OpaqueId> {
        match &self.edit {
            EditSlot::Editing { id, .. } => Some(id),
            EditSlot::None => None,
        }
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut FeedbackDraft> {
        match &mut self.edit {
            EditSlot::Editing { buffer, .. } => Some(buffer),
            EditSlot::None => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditSlot::None;
    }

    /// Pushes the edit buffer as a full replacement. The buffer survives a failure.
    pub async fn save_edit(&mut self) -> Result<FeedbackRecord> {
        let EditSlot::Editing { id, buffer } = &self.edit else {
            return Err(ClientError::Validation("no feedback is being edited".into()));
        };
        let id = id.clone();
        let payload = buffer.to_update();

        let updated = self.api.update_feedback(&id, &payload).await.map_err(|e| {
            tracing::error!("Saving feedback {} failed: {}", id, e);
            e
        })?;
        self.edit = EditSlot::None;
        self.reload_after_write().await;
        Ok(updated)
    }

    pub fn chart(&self) -> Vec<ChartSlice> {
        self.overview.as_ref().map(sentiment_chart).unwrap_or_default()
    }

    pub fn cards(&self) -> Vec<ManagerCard> {
        self.history.iter().map(ManagerCard::from).collect()
    }

    pub fn report(&self) -> Report {
        Report::build(ReportView::Manager, &self.history)
    }

    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf> {
        self.report().save(dir)
    }

    // The write already went through; a failed reload only leaves stale data on screen.
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after write failed: {}", e);
        }
    }
}
