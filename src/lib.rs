pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod guard;
pub mod logging;
pub mod report;
pub mod session;

pub use app::AppContext;
pub use error::{ClientError, Result};
