use super::ids::UserId;
use crate::error::{MarketplaceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Customer,
}

/// The authenticated caller of an operation, as handed over by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub is_worker: bool,
    pub is_customer: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_worker: bool,
    pub is_customer: bool,
    /// Workers stay inactive until approved.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn register(id: UserId, new_user: NewUser, now: DateTime<Utc>) -> Result<Self> {
        new_user.validate()?;
        if !(new_user.is_worker || new_user.is_customer) {
            return Err(MarketplaceError::ValidationError(
                "User must be either a worker or customer".to_string(),
            ));
        }

        Ok(Self {
            id,
            username: new_user.username,
            email: new_user.email,
            is_worker: new_user.is_worker,
            is_customer: new_user.is_customer,
            is_active: !new_user.is_worker,
            created_at: now,
        })
    }

    /// The primary role; the worker flag wins when both are set.
    pub fn role(&self) -> Role {
        if self.is_worker {
            Role::Worker
        } else {
            Role::Customer
        }
    }

    pub fn approve(&mut self) -> Result<()> {
        if !self.is_worker {
            return Err(MarketplaceError::InvalidState(format!(
                "User {} is not a worker",
                self.id
            )));
        }
        if self.is_active {
            return Err(MarketplaceError::InvalidState(format!(
                "Worker {} is already active",
                self.id
            )));
        }
        self.is_active = true;
        Ok(())
    }

    pub fn ensure_customer(&self) -> Result<()> {
        if self.is_customer {
            Ok(())
        } else {
            Err(MarketplaceError::PermissionDenied(format!(
                "User {} is not a customer",
                self.id
            )))
        }
    }

    pub fn ensure_worker(&self) -> Result<()> {
        if self.is_worker {
            Ok(())
        } else {
            Err(MarketplaceError::PermissionDenied(format!(
                "User {} is not a worker",
                self.id
            )))
        }
    }
}
