use super::marketplace::Marketplace;
use crate::domain::ids::{EntityKind, JobId};
use crate::domain::job::{Job, JobUpdate, NewJob};
use crate::domain::ports::ChangeSet;
use crate::domain::user::Principal;
use crate::error::Result;
use chrono::Utc;

impl Marketplace {
    /// Posts a new open job on behalf of a customer.
    pub async fn post_job(&self, principal: &Principal, new_job: NewJob) -> Result<Job> {
        let _guard = self.begin().await;
        let customer = self.authenticate(principal).await?;
        customer.ensure_customer()?;

        let id: JobId = self.allocate(EntityKind::Job).await?;
        let job = Job::post(id, customer.id, new_job, Utc::now())?;
        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(job = %job.id, customer = %customer.id, budget = %job.budget, "job posted");
        Ok(job)
    }

    pub async fn update_job(
        &self,
        principal: &Principal,
        job_id: JobId,
        update: JobUpdate,
    ) -> Result<Job> {
        let _guard = self.begin().await;
        let user = self.authenticate(principal).await?;
        let mut job = self.load_job(job_id).await?;
        job.ensure_owned_by(user.id)?;

        job.apply(update)?;
        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(job = %job.id, "job updated");
        Ok(job)
    }

    /// Stops an open job from collecting further bids.
    pub async fn close_job(&self, principal: &Principal, job_id: JobId) -> Result<Job> {
        let _guard = self.begin().await;
        let user = self.authenticate(principal).await?;
        let mut job = self.load_job(job_id).await?;
        job.ensure_owned_by(user.id)?;

        job.close()?;
        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(job = %job.id, "job closed");
        Ok(job)
    }

    /// Deletes a job along with its bids, payment and reviews.
    pub async fn delete_job(&self, principal: &Principal, job_id: JobId) -> Result<()> {
        let _guard = self.begin().await;
        let user = self.authenticate(principal).await?;
        let job = self.load_job(job_id).await?;
        job.ensure_owned_by(user.id)?;

        self.store
            .commit(ChangeSet {
                removed_jobs: vec![job.id],
                ..Default::default()
            })
            .await?;

        tracing::info!(job = %job.id, "job deleted");
        Ok(())
    }
}
