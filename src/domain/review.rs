use super::ids::{JobId, ReviewId, UserId};
use crate::error::MarketplaceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is being reviewed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Worker,
    Customer,
}

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, MarketplaceError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MarketplaceError::ValidationError(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = MarketplaceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub job: JobId,
    pub reviewer: UserId,
    pub reviewee: UserId,
    pub review_type: ReviewType,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether `other` occupies the same (job, reviewer, reviewee, type) slot.
    pub fn same_slot(&self, other: &Review) -> bool {
        self.job == other.job
            && self.reviewer == other.reviewer
            && self.reviewee == other.reviewee
            && self.review_type == other.review_type
    }
}
