use crate::domain::bid::Bid;
use crate::domain::ids::{BidId, EntityKind, JobId, PaymentId, ReviewId, UserId};
use crate::domain::job::Job;
use crate::domain::payment::Payment;
use crate::domain::ports::{
    BidStore, ChangeSet, JobStore, PaymentStore, ReviewStore, UnitOfWork, UserStore, WalletStore,
};
use crate::domain::review::Review;
use crate::domain::user::User;
use crate::domain::wallet::Wallet;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    bids: BTreeMap<BidId, Bid>,
    payments: BTreeMap<PaymentId, Payment>,
    reviews: BTreeMap<ReviewId, Review>,
    wallets: HashMap<UserId, Wallet>,
    sequences: HashMap<EntityKind, u64>,
}

/// A thread-safe in-memory marketplace store.
///
/// All tables sit behind one `RwLock`, so a commit is applied under a single
/// write guard and readers never observe half of a `ChangeSet`.
/// Ideal for testing or when persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.get(&id).cloned())
    }

    async fn all_jobs(&self) -> Result<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.values().cloned().collect())
    }
}

#[async_trait]
impl BidStore for InMemoryStore {
    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>> {
        let tables = self.tables.read().await;
        Ok(tables.bids.get(&id).cloned())
    }

    async fn bids_for_job(&self, job: JobId) -> Result<Vec<Bid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bids
            .values()
            .filter(|bid| bid.job == job)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.get(&id).cloned())
    }

    async fn payment_for_job(&self, job: JobId) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .find(|payment| payment.job == job)
            .cloned())
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn reviews_for_job(&self, job: JobId) -> Result<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .filter(|review| review.job == job)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WalletStore for InMemoryStore {
    async fn get_wallet(&self, worker: UserId) -> Result<Option<Wallet>> {
        let tables = self.tables.read().await;
        Ok(tables.wallets.get(&worker).cloned())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn next_id(&self, kind: EntityKind) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let sequence = tables.sequences.entry(kind).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut tables = self.tables.write().await;

        for job_id in &changes.removed_jobs {
            tables.jobs.remove(job_id);
            tables.bids.retain(|_, bid| bid.job != *job_id);
            tables.payments.retain(|_, payment| payment.job != *job_id);
            tables.reviews.retain(|_, review| review.job != *job_id);
        }
        for user in changes.users {
            tables.users.insert(user.id, user);
        }
        for job in changes.jobs {
            tables.jobs.insert(job.id, job);
        }
        for bid in changes.bids {
            tables.bids.insert(bid.id, bid);
        }
        for payment in changes.payments {
            tables.payments.insert(payment.id, payment);
        }
        for review in changes.reviews {
            tables.reviews.insert(review.id, review);
        }
        for wallet in changes.wallets {
            tables.wallets.insert(wallet.worker, wallet);
        }
        Ok(())
    }
}
