//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply group authorization before any mutation.
//! - Keep callers decoupled from storage details.

pub mod group_edit_service;
pub mod import_service;
pub mod permission_service;
pub mod provider;
pub mod read_group_service;
pub mod search_service;
