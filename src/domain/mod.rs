//! Marketplace entities and the ports the application layer depends on.
//!
//! Entities own their state transitions: each mutating method checks the
//! precondition it needs and returns a `MarketplaceError` instead of changing
//! anything when the check fails.

pub mod bid;
pub mod ids;
pub mod job;
pub mod money;
pub mod payment;
pub mod ports;
pub mod review;
pub mod user;
pub mod wallet;
