pub mod layout;
pub mod pdf;

use crate::domain::models::FeedbackRecord;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub use layout::{Layout, Page, PlacedLine};

/// Which dashboard the report is exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    Manager,
    Employee,
}

impl ReportView {
    pub fn title(&self) -> &'static str {
        match self {
            ReportView::Manager => "Feedbacks Given",
            ReportView::Employee => "My Feedbacks",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ReportView::Manager => "manager_feedbacks.pdf",
            ReportView::Employee => "employee_feedbacks.pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub view: ReportView,
    pub layout: Layout,
}

impl Report {
    pub fn build(view: ReportView, records: &[FeedbackRecord]) -> Self {
        Self {
            view,
            layout: layout::layout(view, records),
        }
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        pdf::render(&self.layout.pages)
    }

    /// Writes the PDF under the view's fixed file name inside `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.view.file_name());
        std::fs::write(&path, self.to_pdf())?;
        tracing::info!(
            "Saved {} ({} pages) to {}",
            self.view.title(),
            self.page_count(),
            path.display()
        );
        Ok(path)
    }
}
