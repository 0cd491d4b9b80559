use super::marketplace::Marketplace;
use crate::domain::bid;
use crate::domain::ids::{EntityKind, JobId, PaymentId};
use crate::domain::money::Amount;
use crate::domain::payment::{Payment, PaymentMethod};
use crate::domain::ports::ChangeSet;
use crate::domain::user::Principal;
use crate::domain::wallet::Wallet;
use crate::error::{MarketplaceError, Result};
use chrono::Utc;
use rust_decimal::Decimal;

impl Marketplace {
    /// Records the customer's payment for an assigned job. The funds stay in
    /// escrow (`Pending`) until released.
    pub async fn create_payment(
        &self,
        principal: &Principal,
        job_id: JobId,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let _guard = self.begin().await;
        let customer = self.authenticate(principal).await?;
        let job = self.load_job(job_id).await?;
        job.ensure_owned_by(customer.id)?;

        if self.store.payment_for_job(job.id).await?.is_some() {
            return Err(MarketplaceError::Duplicate(format!(
                "Job {} already has a payment",
                job.id
            )));
        }
        if job.assigned_worker.is_none() {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} has no assigned worker",
                job.id
            )));
        }

        let amount = Amount::new(amount)?;
        let bids = self.store.bids_for_job(job.id).await?;
        let selected = bid::selected(&bids).ok_or_else(|| {
            MarketplaceError::InvalidState(format!("Job {} has no selected bid", job.id))
        })?;
        if amount != selected.amount {
            return Err(MarketplaceError::ValidationError(format!(
                "Payment amount {} does not match the selected bid amount {}",
                amount, selected.amount
            )));
        }

        let id: PaymentId = self.allocate(EntityKind::Payment).await?;
        let payment = Payment::escrow(id, job.id, amount, method, Utc::now());
        self.store
            .commit(ChangeSet {
                payments: vec![payment.clone()],
                ..Default::default()
            })
            .await?;

        tracing::info!(payment = %payment.id, job = %job.id, amount = %amount, method = ?method, "payment held in escrow");
        Ok(payment)
    }

    /// Releases escrowed funds to the assigned worker and completes the job.
    pub async fn release_payment(
        &self,
        principal: &Principal,
        payment_id: PaymentId,
    ) -> Result<Payment> {
        let _guard = self.begin().await;
        let customer = self.authenticate(principal).await?;
        let mut payment = self
            .store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found("Payment", payment_id))?;
        let mut job = self.load_job(payment.job).await?;
        job.ensure_owned_by(customer.id)?;

        payment.release()?;
        job.complete()?;
        let worker = job.assigned_worker.ok_or_else(|| {
            MarketplaceError::InvalidState(format!("Job {} has no assigned worker", job.id))
        })?;
        let mut wallet = self
            .store
            .get_wallet(worker)
            .await?
            .unwrap_or_else(|| Wallet::new(worker));
        wallet.credit(payment.amount);

        self.store
            .commit(ChangeSet {
                jobs: vec![job.clone()],
                payments: vec![payment.clone()],
                wallets: vec![wallet],
                ..Default::default()
            })
            .await?;

        tracing::info!(payment = %payment.id, job = %job.id, worker = %worker, amount = %payment.amount, "escrow released");
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use crate::application::test_support::{Fixture, fixture, new_job};
    use crate::domain::ids::{JobId, PaymentId};
    use crate::domain::job::JobStatus;
    use crate::domain::money::Balance;
    use crate::domain::payment::{PaymentMethod, PaymentStatus};
    use crate::error::{MarketplaceError, RejectionKind};
    use rust_decimal_macros::dec;

    async fn assigned_job(fx: &Fixture) -> JobId {
        let job = fx
            .market
            .post_job(&fx.customer, new_job(dec!(100)))
            .await
            .unwrap();
        let bid = fx
            .market
            .submit_bid(&fx.workers[0], job.id, dec!(90.50))
            .await
            .unwrap();
        fx.market.assign_bid(&fx.customer, bid.id).await.unwrap();
        job.id
    }

    #[tokio::test]
    async fn test_payment_must_match_selected_bid() {
        let fx = fixture(1).await;
        let job = assigned_job(&fx).await;

        let err = fx
            .market
            .create_payment(&fx.customer, job, dec!(100), PaymentMethod::Bkash)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::ValidationError(_)));
        assert!(fx.market.payment(job).await.unwrap().is_none());

        let payment = fx
            .market
            .create_payment(&fx.customer, job, dec!(90.5), PaymentMethod::Bkash)
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.value(), dec!(90.50));
    }

    #[tokio::test]
    async fn test_one_payment_per_job() {
        let fx = fixture(1).await;
        let job = assigned_job(&fx).await;
        fx.market
            .create_payment(&fx.customer, job, dec!(90.50), PaymentMethod::Cash)
            .await
            .unwrap();

        let err = fx
            .market
            .create_payment(&fx.customer, job, dec!(90.50), PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::Duplicate));
    }

    #[tokio::test]
    async fn test_payment_requires_assignment() {
        let fx = fixture(1).await;
        let job = fx
            .market
            .post_job(&fx.customer, new_job(dec!(100)))
            .await
            .unwrap();
        let err = fx
            .market
            .create_payment(&fx.customer, job.id, dec!(100), PaymentMethod::Rocket)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::InvalidState));
    }

    #[tokio::test]
    async fn test_only_owner_pays() {
        let fx = fixture(1).await;
        let job = assigned_job(&fx).await;
        let err = fx
            .market
            .create_payment(&fx.workers[0], job, dec!(90.50), PaymentMethod::Nagad)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::Permission));
    }

    #[tokio::test]
    async fn test_release_completes_job_and_credits_worker() {
        let fx = fixture(1).await;
        let job = assigned_job(&fx).await;
        let payment = fx
            .market
            .create_payment(&fx.customer, job, dec!(90.50), PaymentMethod::Bkash)
            .await
            .unwrap();

        let err = fx
            .market
            .release_payment(&fx.workers[0], payment.id)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::Permission));

        let released = fx
            .market
            .release_payment(&fx.customer, payment.id)
            .await
            .unwrap();
        assert_eq!(released.status, PaymentStatus::Completed);

        let job = fx.market.job(job).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.is_consistent());

        let wallet = fx.market.wallet(fx.workers[0].user_id).await.unwrap();
        assert_eq!(wallet.balance, Balance::new(dec!(90.50)));
    }

    #[tokio::test]
    async fn test_release_twice_rejected_and_wallet_credited_once() {
        let fx = fixture(1).await;
        let job = assigned_job(&fx).await;
        let payment = fx
            .market
            .create_payment(&fx.customer, job, dec!(90.50), PaymentMethod::Bkash)
            .await
            .unwrap();
        fx.market
            .release_payment(&fx.customer, payment.id)
            .await
            .unwrap();

        let err = fx
            .market
            .release_payment(&fx.customer, payment.id)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::InvalidState));

        let wallet = fx.market.wallet(fx.workers[0].user_id).await.unwrap();
        assert_eq!(wallet.balance, Balance::new(dec!(90.50)));
    }

    #[tokio::test]
    async fn test_release_unknown_payment() {
        let fx = fixture(0).await;
        let err = fx
            .market
            .release_payment(&fx.customer, PaymentId(3))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionKind::NotFound));
    }
}
