//! # mirror-engine
//!
//! History correlation and revision replay between an svn subtree and a git
//! working tree.
//!
//! A run is two phases per layout: [`correlate`] finds the convergence point
//! and the backlog, then [`replay`] turns each backlog revision into at most
//! one commit. [`run_all`] drives every configured layout in order.

mod context;
mod correlator;
mod error;
mod mapper;
mod orchestrator;
mod replayer;

#[cfg(test)]
mod test_support;

pub use context::RunContext;
pub use correlator::{Correlation, correlate};
pub use error::SyncError;
pub use mapper::PathMapper;
pub use orchestrator::{
    Backends, CommittedRevision, LayoutReport, Mode, NoopObserver, Observer, RunSummary,
    SkippedRevision, run_all, sync_layout,
};
pub use replayer::{Action, PlannedChange, ReplayOutcome, ReplayPlan, SkipReason, plan, replay};
