//! Platform error types.
//!
//! Every collaborator failure is converted to one of these at the call
//! boundary; none of them propagate past the engine's entry points.

use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Generic platform failure (connectivity, invalid references).
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl PlatformError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }
}

/// The asset could not be moved into the staging area.
///
/// Terminal for that submission; the caller must resubmit.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("Staging failed: {0}")]
    StagingFailed(String),
}

impl RelocateError {
    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Self::AssetUnavailable(msg.into())
    }

    pub fn staging_failed(msg: impl Into<String>) -> Self {
        Self::StagingFailed(msg.into())
    }
}

/// Parking failed after a successful relocation.
///
/// Terminal for that submission; the staged asset is considered orphaned.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Park failed: {0}")]
    ParkFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

impl ScheduleError {
    pub fn park_failed(msg: impl Into<String>) -> Self {
        Self::ParkFailed(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }
}

/// A completion probe failed.
///
/// Always treated as transient: logged and retried on the next tick.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe failed: {0}")]
    Transient(String),
}

impl ProbeError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }
}

/// A result could not be delivered or edited in place.
///
/// Logged; never blocks cleanup.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Edit failed: {0}")]
    EditFailed(String),
}

impl DeliveryError {
    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }

    pub fn edit_failed(msg: impl Into<String>) -> Self {
        Self::EditFailed(msg.into())
    }
}
