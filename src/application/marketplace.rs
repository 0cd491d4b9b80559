use crate::config::EngineConfig;
use crate::domain::bid::Bid;
use crate::domain::ids::{EntityKind, JobId, UserId};
use crate::domain::job::{Job, JobFilter};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{ChangeSet, NotifierBox, StoreBox};
use crate::domain::review::Review;
use crate::domain::user::{NewUser, Principal, User};
use crate::domain::wallet::Wallet;
use crate::error::{MarketplaceError, Result};
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

/// A job together with the state of its escrow payment, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub job: Job,
    pub payment: Option<PaymentStatus>,
}

/// The job-bid-payment lifecycle manager.
///
/// `Marketplace` owns the store and the notifier. Every mutating operation
/// holds the write lock from its first read to its commit, so checks such as
/// "one bid per worker" or "at most one payment" cannot interleave with a
/// competing request. Each operation commits one `ChangeSet`.
pub struct Marketplace {
    pub(crate) store: StoreBox,
    pub(crate) notifier: NotifierBox,
    pub(crate) config: EngineConfig,
    write_lock: Mutex<()>,
}

impl Marketplace {
    /// Creates a new `Marketplace`.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for users, jobs, bids, payments, reviews and wallets.
    /// * `notifier` - Outbound channel used when a bid is selected.
    /// * `config` - Engine tunables.
    pub fn new(store: StoreBox, notifier: NotifierBox, config: EngineConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) async fn begin(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) async fn allocate<T: From<u64>>(&self, kind: EntityKind) -> Result<T> {
        Ok(T::from(self.store.next_id(kind).await?))
    }

    /// Resolves the acting principal to an active user.
    pub(crate) async fn authenticate(&self, principal: &Principal) -> Result<User> {
        let user = self
            .store
            .get_user(principal.user_id)
            .await?
            .ok_or_else(|| {
                MarketplaceError::PermissionDenied(format!(
                    "Unknown principal {}",
                    principal.user_id
                ))
            })?;
        if !user.is_active {
            return Err(MarketplaceError::PermissionDenied(format!(
                "Account {} is inactive",
                user.id
            )));
        }
        Ok(user)
    }

    pub(crate) async fn load_job(&self, id: JobId) -> Result<Job> {
        self.store
            .get_job(id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found("Job", id))
    }

    pub async fn register_user(&self, new_user: NewUser) -> Result<User> {
        let _guard = self.begin().await;

        if self
            .store
            .find_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(MarketplaceError::Duplicate(format!(
                "Username '{}' is already taken",
                new_user.username
            )));
        }

        let id: UserId = self.allocate(EntityKind::User).await?;
        let user = User::register(id, new_user, Utc::now())?;
        self.store
            .commit(ChangeSet {
                users: vec![user.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(user = %user.id, role = ?user.role(), active = user.is_active, "user registered");
        Ok(user)
    }

    /// Activates a worker account that is awaiting approval.
    pub async fn approve_worker(&self, user_id: UserId) -> Result<User> {
        let _guard = self.begin().await;

        let mut user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found("User", user_id))?;
        user.approve()?;
        self.store
            .commit(ChangeSet {
                users: vec![user.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(user = %user.id, "worker approved");
        Ok(user)
    }

    pub async fn user(&self, id: UserId) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found("User", id))
    }

    pub async fn job(&self, id: JobId) -> Result<Job> {
        self.load_job(id).await
    }

    pub async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>> {
        Ok(self
            .store
            .all_jobs()
            .await?
            .into_iter()
            .filter(|job| filter.matches(job))
            .collect())
    }

    pub async fn bids(&self, job: JobId) -> Result<Vec<Bid>> {
        self.store.bids_for_job(job).await
    }

    pub async fn payment(&self, job: JobId) -> Result<Option<Payment>> {
        self.store.payment_for_job(job).await
    }

    pub async fn reviews(&self, job: JobId) -> Result<Vec<Review>> {
        self.store.reviews_for_job(job).await
    }

    /// A worker's wallet; workers who were never paid have an empty one.
    pub async fn wallet(&self, worker: UserId) -> Result<Wallet> {
        Ok(self
            .store
            .get_wallet(worker)
            .await?
            .unwrap_or_else(|| Wallet::new(worker)))
    }

    /// Consumes the engine and returns every job with its payment state, ordered by id.
    pub async fn into_results(self) -> Result<Vec<JobSummary>> {
        let jobs = self.store.all_jobs().await?;
        let mut summaries = Vec::with_capacity(jobs.len());
        for job in jobs {
            let payment = self
                .store
                .payment_for_job(job.id)
                .await?
                .map(|payment| payment.status);
            summaries.push(JobSummary { job, payment });
        }
        Ok(summaries)
    }
}
