use crate::domain::models::{non_empty, FeedbackRecord};
use crate::domain::tags::join_tags;
use chrono::{DateTime, Utc};

const PLACEHOLDER: &str = "—";

/// Short US-style date (`3/5/2024`), always in UTC.
pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Manager history card.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerCard {
    pub name: String,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    pub tags: String,
}

impl From<&FeedbackRecord> for ManagerCard {
    fn from(fb: &FeedbackRecord) -> Self {
        let or_placeholder =
            |value: Option<&str>| non_empty(value).unwrap_or(PLACEHOLDER).to_string();
        let tags = join_tags(&fb.tags);
        Self {
            name: or_placeholder(fb.employee_username.as_deref()),
            strengths: or_placeholder(fb.strengths.as_deref()),
            improvements: or_placeholder(fb.improvements.as_deref()),
            sentiment: fb
                .sentiment
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            tags: if tags.is_empty() { PLACEHOLDER.to_string() } else { tags },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    /// Shows the acknowledge action.
    Pending,
    Acknowledged,
}

impl AckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AckStatus::Pending => "Acknowledge",
            AckStatus::Acknowledged => "Acknowledged",
        }
    }
}

/// Employee feedback card.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeCard {
    pub feedback: String,
    pub sentiment: String,
    pub from: String,
    pub date: String,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub tags: Vec<String>,
    pub comment: Option<String>,
    pub status: AckStatus,
}

impl From<&FeedbackRecord> for EmployeeCard {
    fn from(fb: &FeedbackRecord) -> Self {
        let owned = |value: Option<&String>| non_empty(value.map(String::as_str)).map(String::from);
        let from = if fb.anonymous {
            "Anonymous".to_string()
        } else {
            non_empty(fb.manager_username.as_deref())
                .unwrap_or("Manager")
                .to_string()
        };
        Self {
            feedback: fb.content.clone().unwrap_or_default(),
            sentiment: fb
                .sentiment
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            from,
            date: format_date(fb.created_at),
            strengths: owned(fb.strengths.as_ref()),
            improvements: owned(fb.improvements.as_ref()),
            tags: fb.tags.clone(),
            comment: owned(fb.employee_comments.as_ref()),
            status: if fb.acknowledged {
                AckStatus::Acknowledged
            } else {
                AckStatus::Pending
            },
        }
    }
}
