use crate::domain::bid::Bid;
use crate::domain::ids::{BidId, EntityKind, JobId, PaymentId, UserId};
use crate::domain::job::Job;
use crate::domain::payment::Payment;
use crate::domain::ports::{
    BidStore, ChangeSet, JobStore, PaymentStore, ReviewStore, UnitOfWork, UserStore, WalletStore,
};
use crate::domain::review::Review;
use crate::domain::user::User;
use crate::domain::wallet::Wallet;
use crate::error::{MarketplaceError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CF_USERS: &str = "users";
pub const CF_JOBS: &str = "jobs";
pub const CF_BIDS: &str = "bids";
pub const CF_PAYMENTS: &str = "payments";
pub const CF_REVIEWS: &str = "reviews";
pub const CF_WALLETS: &str = "wallets";
/// Id sequences, keyed by entity kind name.
pub const CF_SEQUENCES: &str = "sequences";

const COLUMN_FAMILIES: [&str; 7] = [
    CF_USERS,
    CF_JOBS,
    CF_BIDS,
    CF_PAYMENTS,
    CF_REVIEWS,
    CF_WALLETS,
    CF_SEQUENCES,
];

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own column family, keyed by its big-endian id
/// and encoded as JSON. Commits go through a single `WriteBatch`, so an
/// operation's writes land together or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

fn internal(message: String) -> MarketplaceError {
    MarketplaceError::InternalError(Box::new(std::io::Error::other(message)))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("Column family '{name}' not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.to_be_bytes())? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| internal(format!("Deserialization error in {cf_name}: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Decodes every row of a column family in key order.
    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) =
                item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
            let row = serde_json::from_slice(&value)
                .map_err(|e| internal(format!("Failed to deserialize row in {cf_name}: {e}")))?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn put<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        key: u64,
        value: &T,
    ) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)
            .map_err(|e| internal(format!("Serialization error in {cf_name}: {e}")))?;
        batch.put_cf(cf, key.to_be_bytes(), bytes);
        Ok(())
    }

    fn remove_job(&self, batch: &mut WriteBatch, job: JobId) -> Result<()> {
        batch.delete_cf(self.cf(CF_JOBS)?, job.0.to_be_bytes());

        let bids = self.cf(CF_BIDS)?;
        for bid in self.scan::<Bid>(CF_BIDS)?.into_iter().filter(|b| b.job == job) {
            batch.delete_cf(bids, bid.id.0.to_be_bytes());
        }
        let payments = self.cf(CF_PAYMENTS)?;
        for payment in self
            .scan::<Payment>(CF_PAYMENTS)?
            .into_iter()
            .filter(|p| p.job == job)
        {
            batch.delete_cf(payments, payment.id.0.to_be_bytes());
        }
        let reviews = self.cf(CF_REVIEWS)?;
        for review in self
            .scan::<Review>(CF_REVIEWS)?
            .into_iter()
            .filter(|r| r.job == job)
        {
            batch.delete_cf(reviews, review.id.0.to_be_bytes());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.read(CF_USERS, id.0)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .scan::<User>(CF_USERS)?
            .into_iter()
            .find(|user| user.username == username))
    }
}

#[async_trait]
impl JobStore for RocksDBStore {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        self.read(CF_JOBS, id.0)
    }

    async fn all_jobs(&self) -> Result<Vec<Job>> {
        self.scan(CF_JOBS)
    }
}

#[async_trait]
impl BidStore for RocksDBStore {
    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>> {
        self.read(CF_BIDS, id.0)
    }

    async fn bids_for_job(&self, job: JobId) -> Result<Vec<Bid>> {
        Ok(self
            .scan::<Bid>(CF_BIDS)?
            .into_iter()
            .filter(|bid| bid.job == job)
            .collect())
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, id.0)
    }

    async fn payment_for_job(&self, job: JobId) -> Result<Option<Payment>> {
        Ok(self
            .scan::<Payment>(CF_PAYMENTS)?
            .into_iter()
            .find(|payment| payment.job == job))
    }
}

#[async_trait]
impl ReviewStore for RocksDBStore {
    async fn reviews_for_job(&self, job: JobId) -> Result<Vec<Review>> {
        Ok(self
            .scan::<Review>(CF_REVIEWS)?
            .into_iter()
            .filter(|review| review.job == job)
            .collect())
    }
}

#[async_trait]
impl WalletStore for RocksDBStore {
    async fn get_wallet(&self, worker: UserId) -> Result<Option<Wallet>> {
        self.read(CF_WALLETS, worker.0)
    }
}

#[async_trait]
impl UnitOfWork for RocksDBStore {
    // Callers serialize mutations, so the read-increment-write needs no extra lock.
    async fn next_id(&self, kind: EntityKind) -> Result<u64> {
        let cf = self.cf(CF_SEQUENCES)?;
        let key = kind.as_str().as_bytes();
        let current = match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    internal(format!("Corrupt sequence for {}", kind.as_str()))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.db.put_cf(cf, key, next.to_be_bytes())?;
        Ok(next)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::default();

        for job in &changes.removed_jobs {
            self.remove_job(&mut batch, *job)?;
        }
        for user in &changes.users {
            self.put(&mut batch, CF_USERS, user.id.0, user)?;
        }
        for job in &changes.jobs {
            self.put(&mut batch, CF_JOBS, job.id.0, job)?;
        }
        for bid in &changes.bids {
            self.put(&mut batch, CF_BIDS, bid.id.0, bid)?;
        }
        for payment in &changes.payments {
            self.put(&mut batch, CF_PAYMENTS, payment.id.0, payment)?;
        }
        for review in &changes.reviews {
            self.put(&mut batch, CF_REVIEWS, review.id.0, review)?;
        }
        for wallet in &changes.wallets {
            self.put(&mut batch, CF_WALLETS, wallet.worker.0, wallet)?;
        }

        self.db.write(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::NewJob;
    use crate::domain::money::Amount;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn job(id: u64) -> Job {
        Job::post(
            JobId(id),
            UserId(1),
            NewJob {
                title: "Wire the garage".to_string(),
                description: "Two sockets and a light".to_string(),
                location: "Sylhet".to_string(),
                budget: dec!(250),
                urgency: 2,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some(), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_rocksdb_commit_and_read() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let bid = Bid::new(
            BidId(1),
            JobId(1),
            UserId(2),
            Amount::new(dec!(200)).unwrap(),
            Utc::now(),
        );
        let job = job(1);
        store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                bids: vec![bid.clone()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(store.get_job(JobId(1)).await.unwrap(), Some(job));
        assert_eq!(store.bids_for_job(JobId(1)).await.unwrap(), vec![bid]);
        assert!(store.get_job(JobId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_sequences_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            assert_eq!(store.next_id(EntityKind::Job).await.unwrap(), 1);
            assert_eq!(store.next_id(EntityKind::Job).await.unwrap(), 2);
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.next_id(EntityKind::Job).await.unwrap(), 3);
        assert_eq!(store.next_id(EntityKind::Bid).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_remove_job_cascades() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let bid = Bid::new(
            BidId(1),
            JobId(1),
            UserId(2),
            Amount::new(dec!(200)).unwrap(),
            Utc::now(),
        );
        store
            .commit(ChangeSet {
                jobs: vec![job(1)],
                bids: vec![bid],
                ..Default::default()
            })
            .await
            .unwrap();

        store
            .commit(ChangeSet {
                removed_jobs: vec![JobId(1)],
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(store.get_job(JobId(1)).await.unwrap().is_none());
        assert!(store.get_bid(BidId(1)).await.unwrap().is_none());
    }
}
