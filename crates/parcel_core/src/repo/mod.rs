//! Repository layer for parcel persistence.
//!
//! # Responsibility
//! - Define the data access contract used by the service layer.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Every statement binds its inputs as parameters.
//! - Lookups report `NotFound` separately from storage failures.

pub mod parcel_repo;
