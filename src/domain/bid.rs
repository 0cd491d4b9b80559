use super::ids::{BidId, JobId, UserId};
use super::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[default]
    NotSelected,
    Selected,
    Ignored,
}

/// A worker's offer on a job. A worker holds at most one bid per job.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Bid {
    pub id: BidId,
    pub job: JobId,
    pub worker: UserId,
    pub amount: Amount,
    pub status: BidStatus,
    pub timestamp: DateTime<Utc>,
}

impl Bid {
    pub fn new(id: BidId, job: JobId, worker: UserId, amount: Amount, now: DateTime<Utc>) -> Self {
        Self {
            id,
            job,
            worker,
            amount,
            status: BidStatus::NotSelected,
            timestamp: now,
        }
    }
}

/// Marks `winner` as selected and every other bid as ignored.
///
/// Returns `false` without touching anything when `winner` is not among `bids`.
pub fn settle(bids: &mut [Bid], winner: BidId) -> bool {
    if !bids.iter().any(|bid| bid.id == winner) {
        return false;
    }
    for bid in bids.iter_mut() {
        bid.status = if bid.id == winner {
            BidStatus::Selected
        } else {
            BidStatus::Ignored
        };
    }
    true
}

/// Returns every bid to `NotSelected`, as when a job is reopened.
pub fn reopen(bids: &mut [Bid]) {
    for bid in bids.iter_mut() {
        bid.status = BidStatus::NotSelected;
    }
}

pub fn selected(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().find(|bid| bid.status == BidStatus::Selected)
}
