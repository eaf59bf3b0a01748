//! Parcel tracking workflows.
//!
//! # Responsibility
//! - Register parcels with lifecycle defaults.
//! - Advance a parcel one lifecycle step at a time.
//!
//! # Invariants
//! - Service APIs never bypass the store's SQL preconditions.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for parcel workflows.
#[derive(Debug)]
pub enum ServiceError {
    /// The parcel has reached its final state.
    AlreadyDelivered(ParcelNumber),
    /// Persistence-layer failure, including `NotFound`.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyDelivered(number) => write!(f, "parcel {number} is already delivered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyDelivered(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case wrapper over a parcel store.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns it with its number set.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, client
        );
        Ok(parcel)
    }

    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }

    /// Moves the parcel to the next lifecycle state and returns that state.
    ///
    /// # Errors
    /// - `ServiceError::AlreadyDelivered` when the parcel is `delivered`.
    /// - `ServiceError::Repo(RepoError::NotFound)` when the parcel does not exist.
    pub fn next_status(&self, number: ParcelNumber) -> ServiceResult<ParcelStatus> {
        let parcel = self.repo.get(number)?;
        let next = parcel
            .status
            .next()
            .ok_or(ServiceError::AlreadyDelivered(number))?;
        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(next)
    }

    /// Sets an explicit status, skipping lifecycle order.
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.repo.set_status(number, status)
    }

    /// Changes the address; silently ignored unless the parcel is `registered`.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address)
    }

    /// Deletes the parcel; silently ignored unless the parcel is `registered`.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number)
    }
}
