//! Parcel use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into tracker workflows.
//! - Keep the CLI decoupled from storage details.

pub mod parcel_service;
