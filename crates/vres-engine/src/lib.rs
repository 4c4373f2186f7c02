//! Concurrency and lifecycle control for externally processed videos.
//!
//! This crate coordinates submissions through admission control, per-owner
//! FIFO overflow queueing, in-flight tracking, completion polling, timeout
//! enforcement and guaranteed cleanup:
//! - [`ConcurrencyLedger`] — per-owner in-flight counters
//! - [`QueueStore`] — per-owner FIFO queues awaiting a slot
//! - [`JobRegistry`] — the authoritative in-flight table
//! - [`Coordinator`] — submission, cancellation, completion and cleanup
//! - [`CompletionPoller`] — the periodic probe-and-expire sweep
//!
//! Everything is in-process and memory-resident; nothing survives a restart.

pub mod config;
pub mod coordinator;
pub mod ledger;
pub mod poller;
pub mod queue_store;
pub mod registry;

pub use config::EngineConfig;
pub use coordinator::Coordinator;
pub use ledger::ConcurrencyLedger;
pub use poller::{CompletionPoller, SweepStats};
pub use queue_store::QueueStore;
pub use registry::JobRegistry;
