//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep outer API layers decoupled from storage details.

pub mod epic_service;
