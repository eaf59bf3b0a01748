//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical parcel record stored in the `parcel` table.
//! - Keep lifecycle states as a closed enumeration.
//!
//! # Invariants
//! - Every parcel is identified by a store-assigned `ParcelNumber`.
//! - Every parcel belongs to exactly one client.

pub mod parcel;
