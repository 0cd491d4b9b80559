use super::ids::{JobId, PaymentId};
use super::money::Amount;
use crate::error::{MarketplaceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the customer says they paid. Recorded only, never processed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    Rocket,
    Cash,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Funds are held in escrow.
    Pending,
    /// Funds were released to the worker.
    Completed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub job: JobId,
    pub amount: Amount,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn escrow(
        id: PaymentId,
        job: JobId,
        amount: Amount,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job,
            amount,
            method,
            status: PaymentStatus::Pending,
            created_at: now,
        }
    }

    pub fn release(&mut self) -> Result<()> {
        if self.status != PaymentStatus::Pending {
            return Err(MarketplaceError::InvalidState(format!(
                "Payment {} already released or invalid",
                self.id
            )));
        }
        self.status = PaymentStatus::Completed;
        Ok(())
    }
}
