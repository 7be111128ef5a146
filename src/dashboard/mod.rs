pub mod employee;
pub mod manager;

pub use employee::EmployeeDashboard;
pub use manager::{ComposeForm, EditSlot, FeedbackDraft, ManagerDashboard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
}
