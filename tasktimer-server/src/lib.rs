//! `tasktimer` task store server library.
//!
//! Exposes the file-backed [`store::TaskStore`] and the axum HTTP surface
//! for use in tests and embedding.

pub mod api;
pub mod config;
pub mod store;
