//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ordering coordinators into transactional use-case APIs.
//! - Keep CLI and upstream call sites decoupled from storage details.

pub mod ordering_service;
