use crate::application::Marketplace;
use crate::domain::ids::{BidId, JobId, PaymentId, UserId};
use crate::domain::job::{JobUpdate, NewJob};
use crate::domain::payment::PaymentMethod;
use crate::domain::user::{NewUser, Principal};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One inbound request, tagged by `op`. `actor` is the authenticated user id.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    RegisterUser(NewUser),
    ApproveWorker {
        user: UserId,
    },
    PostJob {
        actor: UserId,
        #[serde(flatten)]
        job: NewJob,
    },
    UpdateJob {
        actor: UserId,
        job: JobId,
        #[serde(flatten)]
        update: JobUpdate,
    },
    CloseJob {
        actor: UserId,
        job: JobId,
    },
    DeleteJob {
        actor: UserId,
        job: JobId,
    },
    SubmitBid {
        actor: UserId,
        job: JobId,
        amount: Decimal,
    },
    AssignBid {
        actor: UserId,
        bid: BidId,
    },
    UnassignJob {
        actor: UserId,
        job: JobId,
    },
    CreatePayment {
        actor: UserId,
        job: JobId,
        amount: Decimal,
        method: PaymentMethod,
    },
    ReleasePayment {
        actor: UserId,
        payment: PaymentId,
    },
    ReviewWorker {
        actor: UserId,
        job: JobId,
        rating: u8,
        #[serde(default)]
        comment: String,
    },
    ReviewCustomer {
        actor: UserId,
        job: JobId,
        rating: u8,
        #[serde(default)]
        comment: String,
    },
}

impl Request {
    /// Runs the request against `market` and describes what happened.
    pub async fn dispatch(self, market: &Marketplace) -> Result<String> {
        let outcome = match self {
            Request::RegisterUser(new_user) => {
                let user = market.register_user(new_user).await?;
                format!("registered user {}", user.id)
            }
            Request::ApproveWorker { user } => {
                market.approve_worker(user).await?;
                format!("approved worker {user}")
            }
            Request::PostJob { actor, job } => {
                let job = market.post_job(&Principal::new(actor), job).await?;
                format!("posted job {}", job.id)
            }
            Request::UpdateJob { actor, job, update } => {
                market
                    .update_job(&Principal::new(actor), job, update)
                    .await?;
                format!("updated job {job}")
            }
            Request::CloseJob { actor, job } => {
                market.close_job(&Principal::new(actor), job).await?;
                format!("closed job {job}")
            }
            Request::DeleteJob { actor, job } => {
                market.delete_job(&Principal::new(actor), job).await?;
                format!("deleted job {job}")
            }
            Request::SubmitBid { actor, job, amount } => {
                let bid = market
                    .submit_bid(&Principal::new(actor), job, amount)
                    .await?;
                format!("bid {} on job {job}", bid.id)
            }
            Request::AssignBid { actor, bid } => {
                let job = market.assign_bid(&Principal::new(actor), bid).await?;
                format!("assigned bid {bid} on job {}", job.id)
            }
            Request::UnassignJob { actor, job } => {
                market.unassign_job(&Principal::new(actor), job).await?;
                format!("unassigned job {job}")
            }
            Request::CreatePayment {
                actor,
                job,
                amount,
                method,
            } => {
                let payment = market
                    .create_payment(&Principal::new(actor), job, amount, method)
                    .await?;
                format!("payment {} for job {job}", payment.id)
            }
            Request::ReleasePayment { actor, payment } => {
                market
                    .release_payment(&Principal::new(actor), payment)
                    .await?;
                format!("released payment {payment}")
            }
            Request::ReviewWorker {
                actor,
                job,
                rating,
                comment,
            } => {
                let review = market
                    .review_worker(&Principal::new(actor), job, rating, comment)
                    .await?;
                format!("review {} for job {job}", review.id)
            }
            Request::ReviewCustomer {
                actor,
                job,
                rating,
                comment,
            } => {
                let review = market
                    .review_customer(&Principal::new(actor), job, rating, comment)
                    .await?;
                format!("review {} for job {job}", review.id)
            }
        };
        Ok(outcome)
    }
}
