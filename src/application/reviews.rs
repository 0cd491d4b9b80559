use super::marketplace::Marketplace;
use crate::domain::ids::{EntityKind, JobId, ReviewId};
use crate::domain::ports::ChangeSet;
use crate::domain::review::{Rating, Review, ReviewType};
use crate::domain::user::Principal;
use crate::error::{MarketplaceError, Result};
use chrono::Utc;

impl Marketplace {
    /// The job's customer rates the worker who completed it.
    pub async fn review_worker(
        &self,
        principal: &Principal,
        job_id: JobId,
        rating: u8,
        comment: String,
    ) -> Result<Review> {
        self.submit_review(principal, job_id, ReviewType::Worker, rating, comment)
            .await
    }

    /// The assigned worker rates the customer who posted the job.
    pub async fn review_customer(
        &self,
        principal: &Principal,
        job_id: JobId,
        rating: u8,
        comment: String,
    ) -> Result<Review> {
        self.submit_review(principal, job_id, ReviewType::Customer, rating, comment)
            .await
    }

    async fn submit_review(
        &self,
        principal: &Principal,
        job_id: JobId,
        review_type: ReviewType,
        rating: u8,
        comment: String,
    ) -> Result<Review> {
        let _guard = self.begin().await;
        let reviewer = self.authenticate(principal).await?;
        let job = self.load_job(job_id).await?;

        let reviewee = match review_type {
            ReviewType::Worker => {
                job.ensure_owned_by(reviewer.id)?;
                job.assigned_worker
            }
            ReviewType::Customer => {
                if job.assigned_worker != Some(reviewer.id) {
                    return Err(MarketplaceError::PermissionDenied(format!(
                        "User {} is not the worker assigned to job {}",
                        reviewer.id, job.id
                    )));
                }
                Some(job.customer)
            }
        };
        job.ensure_completed()?;
        let reviewee = reviewee.ok_or_else(|| {
            MarketplaceError::InvalidState(format!("Job {} has no assigned worker", job.id))
        })?;
        let rating = Rating::new(rating)?;

        let id: ReviewId = self.allocate(EntityKind::Review).await?;
        let review = Review {
            id,
            job: job.id,
            reviewer: reviewer.id,
            reviewee,
            review_type,
            rating,
            comment,
            created_at: Utc::now(),
        };
        let existing = self.store.reviews_for_job(job.id).await?;
        if existing.iter().any(|other| other.same_slot(&review)) {
            return Err(MarketplaceError::Duplicate(format!(
                "User {} already reviewed job {}",
                reviewer.id, job.id
            )));
        }

        self.store
            .commit(ChangeSet {
                reviews: vec![review.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(review = %review.id, job = %job.id, reviewer = %review.reviewer, reviewee = %review.reviewee, rating = rating.value(), "review submitted");
        Ok(review)
    }
}
