//! Platform collaborator interfaces for the VideoRes coordination engine.
//!
//! This crate defines the seam between the in-process engine and everything
//! external to it:
//! - [`ProcessingPlatform`] — staging, parking, probing, delivery, notices
//! - [`LimitPolicy`] — plan/role based concurrency ceilings
//! - The error taxonomy for collaborator failures

pub mod error;
pub mod interface;
pub mod limits;

pub use error::{
    DeliveryError, PlatformError, PlatformResult, ProbeError, RelocateError, ScheduleError,
};
pub use interface::{ProcessingPlatform, Staged};
pub use limits::{ConcurrencyLimits, LimitPolicy, StaticLimits};
