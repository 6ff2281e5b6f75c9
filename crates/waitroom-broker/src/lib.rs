//! # waitroom-broker
//!
//! The allocation engine: room capacities, the waiting-client ledger, the
//! FIFO wait queue, and the matching/expiry state machine that ties them
//! together. Everything else in the workspace is I/O glue around this
//! crate.
//!
//! A single client moves through these states:
//!
//! ```text
//! Waiting ──poll, no capacity──────────▶ Waiting
//! Waiting ──poll, capacity─────────────▶ Done     (slot debited now)
//! Waiting ──slot freed, queue head─────▶ Reserved (slot debited now)
//! Reserved ─next poll──────────────────▶ Done     (no second debit)
//! Reserved ─silent past timeout────────▶ Expired  (slot returned)
//! Waiting ──silent past timeout────────▶ Expired
//! ```
//!
//! `Done` and `Expired` are terminal: the token leaves the ledger and a
//! later poll with it answers `UnknownClient`.

pub mod engine;
pub mod state;

pub use engine::AllocationEngine;
pub use state::{BrokerState, PollOutcome};
