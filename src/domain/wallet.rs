use super::ids::UserId;
use super::money::{Amount, Balance};
use serde::{Deserialize, Serialize};

/// Funds released to a worker from escrow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Wallet {
    pub worker: UserId,
    pub balance: Balance,
}

impl Wallet {
    pub fn new(worker: UserId) -> Self {
        Self {
            worker,
            balance: Balance::ZERO,
        }
    }

    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }
}
