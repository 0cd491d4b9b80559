use super::marketplace::Marketplace;
use crate::domain::bid::{self, Bid};
use crate::domain::ids::{BidId, EntityKind, JobId};
use crate::domain::job::Job;
use crate::domain::money::Amount;
use crate::domain::ports::{ChangeSet, Notification};
use crate::domain::user::Principal;
use crate::error::{MarketplaceError, Result};
use chrono::Utc;
use rust_decimal::Decimal;

impl Marketplace {
    /// Places a worker's bid on an open job.
    pub async fn submit_bid(
        &self,
        principal: &Principal,
        job_id: JobId,
        amount: Decimal,
    ) -> Result<Bid> {
        let _guard = self.begin().await;
        let worker = self.authenticate(principal).await?;
        worker.ensure_worker()?;
        let amount = Amount::new(amount)?;

        let job = self.load_job(job_id).await?;
        job.ensure_accepting_bids()?;
        if job.is_owned_by(worker.id) {
            return Err(MarketplaceError::PermissionDenied(format!(
                "User {} cannot bid on their own job {}",
                worker.id, job.id
            )));
        }
        let existing = self.store.bids_for_job(job.id).await?;
        if existing.iter().any(|bid| bid.worker == worker.id) {
            return Err(MarketplaceError::Duplicate(format!(
                "Worker {} already has a bid on job {}",
                worker.id, job.id
            )));
        }

        let id: BidId = self.allocate(EntityKind::Bid).await?;
        let bid = Bid::new(id, job.id, worker.id, amount, Utc::now());
        self.store
            .commit(ChangeSet {
                bids: vec![bid.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(bid = %bid.id, job = %job.id, worker = %worker.id, amount = %amount, "bid submitted");
        Ok(bid)
    }

    /// Awards the job to the bid's worker: the bid becomes selected and every
    /// other bid on the job is ignored. The worker is notified afterwards.
    pub async fn assign_bid(&self, principal: &Principal, bid_id: BidId) -> Result<Job> {
        let guard = self.begin().await;
        let customer = self.authenticate(principal).await?;
        let winner = self
            .store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found("Bid", bid_id))?;
        let mut job = self.load_job(winner.job).await?;
        job.ensure_owned_by(customer.id)?;

        let budget = self
            .config
            .overwrite_budget_on_assign
            .then_some(winner.amount);
        job.assign(winner.worker, budget)?;

        let mut bids = self.store.bids_for_job(job.id).await?;
        if !bid::settle(&mut bids, winner.id) {
            return Err(MarketplaceError::InternalError(
                format!("Bid {} missing from job {}", winner.id, job.id).into(),
            ));
        }
        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                bids,
                ..Default::default()
            })
            .await?;
        drop(guard);

        tracing::info!(job = %job.id, bid = %winner.id, worker = %winner.worker, "bid assigned");
        self.notify_selected_worker(&job).await;
        Ok(job)
    }

    /// Takes the job back from its worker and reopens it for bidding.
    pub async fn unassign_job(&self, principal: &Principal, job_id: JobId) -> Result<Job> {
        let _guard = self.begin().await;
        let customer = self.authenticate(principal).await?;
        let mut job = self.load_job(job_id).await?;
        job.ensure_owned_by(customer.id)?;

        if self.store.payment_for_job(job.id).await?.is_some() {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} already has a payment and cannot be unassigned",
                job.id
            )));
        }
        let previous = job.assigned_worker;
        job.unassign()?;

        let mut bids = self.store.bids_for_job(job.id).await?;
        bid::reopen(&mut bids);
        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                bids,
                ..Default::default()
            })
            .await?;

        tracing::info!(job = %job.id, worker = ?previous, "job unassigned");
        Ok(job)
    }

    // Delivery failures are logged and never undo the assignment.
    async fn notify_selected_worker(&self, job: &Job) {
        let Some(worker_id) = job.assigned_worker else {
            return;
        };
        let worker = match self.store.get_user(worker_id).await {
            Ok(Some(worker)) => worker,
            Ok(None) => {
                tracing::warn!(job = %job.id, worker = %worker_id, "selected worker not found, skipping notification");
                return;
            }
            Err(e) => {
                tracing::warn!(job = %job.id, worker = %worker_id, error = %e, "failed to load selected worker");
                return;
            }
        };
        if let Err(e) = self
            .notifier
            .send(Notification::bid_selected(&worker, job))
            .await
        {
            tracing::warn!(job = %job.id, worker = %worker.id, error = %e, "failed to send bid notification");
        }
    }
}
