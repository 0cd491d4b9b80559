use super::bid::Bid;
use super::ids::{BidId, EntityKind, JobId, PaymentId, UserId};
use super::job::Job;
use super::payment::Payment;
use super::review::Review;
use super::user::User;
use super::wallet::Wallet;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>>;
    /// All jobs ordered by id.
    async fn all_jobs(&self) -> Result<Vec<Job>>;
}

#[async_trait]
pub trait BidStore: Send + Sync {
    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>>;
    /// Bids placed on `job`, ordered by id.
    async fn bids_for_job(&self, job: JobId) -> Result<Vec<Bid>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>>;
    async fn payment_for_job(&self, job: JobId) -> Result<Option<Payment>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn reviews_for_job(&self, job: JobId) -> Result<Vec<Review>>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get_wallet(&self, worker: UserId) -> Result<Option<Wallet>>;
}

/// Writes produced by a single operation, applied all-or-nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeSet {
    pub users: Vec<User>,
    pub jobs: Vec<Job>,
    pub bids: Vec<Bid>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
    pub wallets: Vec<Wallet>,
    /// Jobs to delete together with their bids, payment and reviews.
    pub removed_jobs: Vec<JobId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.jobs.is_empty()
            && self.bids.is_empty()
            && self.payments.is_empty()
            && self.reviews.is_empty()
            && self.wallets.is_empty()
            && self.removed_jobs.is_empty()
    }
}

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Draws the next id of `kind`. Ids start at 1 and are never reused.
    async fn next_id(&self, kind: EntityKind) -> Result<u64>;
    async fn commit(&self, changes: ChangeSet) -> Result<()>;
}

/// Everything the lifecycle engine needs from persistence.
pub trait MarketplaceStore:
    UserStore + JobStore + BidStore + PaymentStore + ReviewStore + WalletStore + UnitOfWork
{
}

impl<T> MarketplaceStore for T where
    T: UserStore + JobStore + BidStore + PaymentStore + ReviewStore + WalletStore + UnitOfWork
{
}

pub type StoreBox = Box<dyn MarketplaceStore>;

/// An outbound message to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn bid_selected(worker: &User, job: &Job) -> Self {
        Self {
            recipient: worker.email.clone(),
            subject: "Bid Selected".to_string(),
            body: format!("Your bid for the job '{}' has been selected.", job.title),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<()>;
}

pub type NotifierBox = Box<dyn Notifier>;
