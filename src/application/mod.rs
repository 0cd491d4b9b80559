//! Application layer containing the lifecycle orchestration.
//!
//! `Marketplace` is the entry point for every operation. Its methods are split
//! by lifecycle stage: job management, bidding and assignment, payment
//! settlement and reviews.

mod bidding;
mod jobs;
pub mod marketplace;
mod reviews;
mod settlement;

pub use marketplace::{JobSummary, Marketplace};
