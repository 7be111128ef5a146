pub mod chart;
pub mod models;
pub mod tags;
pub mod view;
