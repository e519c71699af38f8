//! newtab-core library
//!
//! Settings and background-image management for the new-tab extension:
//! validated hydration from extension storage, optimistic updates with
//! rollback, and quota-checked image uploads.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
