//! `crmsync-recon`: Record reconciliation and bulk-association engine.
//!
//! Pure engine crate: receives a loaded association snapshot, resolves
//! business keys to target ids through the [`KeyLookup`] seam, writes
//! associations through the [`BatchWriter`] seam, and returns one
//! outcome per input row. No HTTP or CLI dependencies.

pub mod classify;
pub mod config;
pub mod country;
pub mod engine;
pub mod error;
pub mod model;
pub mod pacing;
pub mod preflight;
pub mod resolve;
pub mod snapshot;
pub mod submit;
pub mod transform;

pub use config::JobConfig;
pub use engine::{run, Target};
pub use error::{LookupError, ReconError};
pub use model::{Outcome, ReconReport, ReconSummary, RowOutcome};
pub use pacing::{Clock, ThreadClock};
pub use resolve::KeyLookup;
pub use submit::{AssociationKind, BatchWriter};
