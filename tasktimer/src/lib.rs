//! Terminal task timer library.

pub mod api;
pub mod app;
pub mod config;
pub mod export;
pub mod tasks;
pub mod ui;
