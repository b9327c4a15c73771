//! Gmail inbox browser with model-backed summaries and reply suggestions.

pub mod ai;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod session;
pub mod terminal;
